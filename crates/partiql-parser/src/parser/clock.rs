//! Source of the current time for `UTCNOW()`.

use chrono::{DateTime, SubsecRound, Utc};
use once_cell::sync::Lazy;
use parking_lot::RwLock;

static FAKE_NOW: Lazy<RwLock<Option<DateTime<Utc>>>> = Lazy::new(|| RwLock::new(None));

/// Pins the value returned by [`now`], or clears the override with
/// `None`.
///
/// The override is process-wide. It is meant for single-threaded test
/// code and for tools that need reproducible output.
pub fn set_fake_now(ts: Option<DateTime<Utc>>) {
    *FAKE_NOW.write() = ts.map(|t| t.trunc_subsecs(6));
}

/// Current time in UTC at microsecond resolution.
#[must_use]
pub fn now() -> DateTime<Utc> {
    let pinned = *FAKE_NOW.read();
    pinned.unwrap_or_else(|| Utc::now().trunc_subsecs(6))
}
