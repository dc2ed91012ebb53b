//! Reusable per-parse scratch state.
//!
//! A parse borrows a [`ParserState`] from a [`ParserPool`] and hands it
//! back when it is done, successful or not. States are reset on the way
//! back in, so a state handed out is always pristine.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use tracing::trace;

use super::clock;
use crate::ast::{Cte, Expr};

/// Number of idle states a pool keeps around.
const MAX_IDLE: usize = 32;

/// Scratch state accumulated while parsing one query.
#[derive(Debug, Default)]
pub struct ParserState {
    /// `WITH` bindings, in source order.
    pub with: Vec<Cte>,
    /// `INTO` target of the outermost SELECT.
    pub into: Option<Expr>,
    now: Option<DateTime<Utc>>,
}

impl ParserState {
    /// Returns the time used for every `UTCNOW()` of this parse.
    ///
    /// The clock is read on first use and memoized.
    pub fn now(&mut self) -> DateTime<Utc> {
        *self.now.get_or_insert_with(clock::now)
    }

    /// Clears everything, keeping allocations.
    pub fn reset(&mut self) {
        self.with.clear();
        self.into = None;
        self.now = None;
    }

    /// Whether the state holds nothing from a previous parse.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.with.is_empty() && self.into.is_none() && self.now.is_none()
    }
}

/// A pool of [`ParserState`] values.
#[derive(Debug, Default)]
pub struct ParserPool {
    idle: Mutex<Vec<ParserState>>,
}

impl ParserPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a pristine state out of the pool, allocating one if the pool
    /// is empty.
    pub fn acquire(&self) -> ParserState {
        match self.idle.lock().pop() {
            Some(state) => {
                trace!("reusing pooled parser state");
                state
            }
            None => {
                trace!("allocating parser state");
                ParserState::default()
            }
        }
    }

    /// Resets `state` and returns it to the pool.
    pub fn release(&self, mut state: ParserState) {
        state.reset();
        let mut idle = self.idle.lock();
        if idle.len() < MAX_IDLE {
            idle.push(state);
        } else {
            trace!("parser pool full, dropping state");
        }
    }

    /// Number of idle states.
    #[must_use]
    pub fn idle(&self) -> usize {
        self.idle.lock().len()
    }
}

static GLOBAL: Lazy<ParserPool> = Lazy::new(ParserPool::new);

/// The process-wide pool used by [`crate::parser::parse`].
#[must_use]
pub fn global() -> &'static ParserPool {
    &GLOBAL
}
