//! Operator tables for precedence climbing.
//!
//! Binding strength comes from [`Precedence`], the same table the
//! renderer uses to decide where parentheses are needed. An operator at
//! level `p` is applied while `p >= min`; left-associative operators
//! parse their right operand at `p.next()`.

use crate::ast::{ArithOp, CompareOp, LogicalOp, MatchOp, Precedence};
use crate::lexer::{Keyword, TokenKind};

/// Operators that appear before their operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `NOT x` or `!x`
    Not,
    /// `-x`
    Neg,
    /// `~x`
    BitNot,
}

/// Operators that follow a complete left operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Infix {
    Logical(LogicalOp),
    Compare(CompareOp),
    Arith(ArithOp),
    Match(MatchOp),
    /// `||`
    Concat,
    /// `++`
    Append,
    Is,
    In,
    Between,
    /// `NOT` in front of `IN`, `BETWEEN` or a pattern match.
    Not,
}

/// Returns the prefix operator for a token and the level its operand is
/// parsed at.
#[must_use]
pub const fn prefix_operator(kind: &TokenKind) -> Option<(Prefix, Precedence)> {
    match kind {
        TokenKind::Keyword(Keyword::Not) => Some((Prefix::Not, Precedence::Not)),
        TokenKind::Tilde => Some((Prefix::BitNot, Precedence::Not)),
        TokenKind::Minus => Some((Prefix::Neg, Precedence::Negate)),
        _ => None,
    }
}

/// Returns the infix operator for a token together with its level.
///
/// Returns `None` if the token cannot continue an expression.
#[must_use]
pub const fn infix_operator(kind: &TokenKind) -> Option<(Infix, Precedence)> {
    let op = match kind {
        TokenKind::Keyword(Keyword::Or) => Infix::Logical(LogicalOp::Or),
        TokenKind::Keyword(Keyword::And) => Infix::Logical(LogicalOp::And),

        TokenKind::Keyword(Keyword::Not) => Infix::Not,
        TokenKind::Keyword(Keyword::Between) => Infix::Between,

        TokenKind::Eq => Infix::Compare(CompareOp::Eq),
        TokenKind::NotEq => Infix::Compare(CompareOp::NotEq),
        TokenKind::Lt => Infix::Compare(CompareOp::Lt),
        TokenKind::LtEq => Infix::Compare(CompareOp::LtEq),
        TokenKind::Gt => Infix::Compare(CompareOp::Gt),
        TokenKind::GtEq => Infix::Compare(CompareOp::GtEq),

        TokenKind::Keyword(Keyword::Like) => Infix::Match(MatchOp::Like),
        TokenKind::Keyword(Keyword::Ilike) => Infix::Match(MatchOp::Ilike),
        TokenKind::Keyword(Keyword::Similar) => Infix::Match(MatchOp::SimilarTo),
        TokenKind::Tilde => Infix::Match(MatchOp::RegexMatch),
        TokenKind::RegexMatchCi => Infix::Match(MatchOp::RegexMatchCi),
        TokenKind::Keyword(Keyword::Is) => Infix::Is,
        TokenKind::Keyword(Keyword::In) => Infix::In,

        TokenKind::BitOr => Infix::Arith(ArithOp::BitOr),
        TokenKind::Caret => Infix::Arith(ArithOp::BitXor),
        TokenKind::BitAnd => Infix::Arith(ArithOp::BitAnd),
        TokenKind::ShiftLeft => Infix::Arith(ArithOp::ShiftLeft),
        TokenKind::ShiftRightArith => Infix::Arith(ArithOp::ShiftRightArith),
        TokenKind::ShiftRightLogical => Infix::Arith(ArithOp::ShiftRightLogical),
        TokenKind::Plus => Infix::Arith(ArithOp::Add),
        TokenKind::Minus => Infix::Arith(ArithOp::Sub),
        TokenKind::Star => Infix::Arith(ArithOp::Mul),
        TokenKind::Slash => Infix::Arith(ArithOp::Div),
        TokenKind::Percent => Infix::Arith(ArithOp::Mod),

        TokenKind::Concat => Infix::Concat,
        TokenKind::Append => Infix::Append,

        _ => return None,
    };
    Some((op, op.precedence()))
}

impl Infix {
    /// Level at which the operator binds to its left operand.
    #[must_use]
    pub const fn precedence(&self) -> Precedence {
        match self {
            Self::Logical(LogicalOp::Or) => Precedence::Or,
            Self::Logical(LogicalOp::And) => Precedence::And,
            // `a = b NOT IN (...)` negates the whole comparison
            Self::Between | Self::Not => Precedence::Between,
            Self::Compare(_) => Precedence::Compare,
            Self::Match(_) | Self::Is | Self::In => Precedence::Predicate,
            Self::Arith(op) => op.precedence(),
            Self::Concat | Self::Append => Precedence::Concat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(kind: &TokenKind) -> Precedence {
        infix_operator(kind).map_or(Precedence::Lowest, |(_, p)| p)
    }

    #[test]
    fn test_arithmetic_levels() {
        assert!(level(&TokenKind::Star) > level(&TokenKind::Plus));
        assert!(level(&TokenKind::Plus) > level(&TokenKind::ShiftLeft));
        assert!(level(&TokenKind::ShiftLeft) > level(&TokenKind::BitAnd));
        assert!(level(&TokenKind::BitAnd) > level(&TokenKind::Caret));
        assert!(level(&TokenKind::Caret) > level(&TokenKind::BitOr));
        assert!(level(&TokenKind::Concat) > level(&TokenKind::Star));
    }

    #[test]
    fn test_logical_levels() {
        let and = level(&TokenKind::Keyword(Keyword::And));
        let or = level(&TokenKind::Keyword(Keyword::Or));
        let eq = level(&TokenKind::Eq);
        let like = level(&TokenKind::Keyword(Keyword::Like));

        assert!(or < and);
        assert!(and < eq);
        assert!(eq < like);
        assert!(like < level(&TokenKind::BitOr));
    }

    #[test]
    fn test_tilde_is_both_prefix_and_infix() {
        assert_eq!(
            prefix_operator(&TokenKind::Tilde),
            Some((Prefix::BitNot, Precedence::Not))
        );
        assert_eq!(
            infix_operator(&TokenKind::Tilde),
            Some((Infix::Match(MatchOp::RegexMatch), Precedence::Predicate))
        );
    }

    #[test]
    fn test_minus_prefix_binds_tightest() {
        let (op, prec) = prefix_operator(&TokenKind::Minus).unwrap();
        assert_eq!(op, Prefix::Neg);
        assert!(prec > level(&TokenKind::Concat));
    }

    #[test]
    fn test_non_operators() {
        assert!(infix_operator(&TokenKind::Comma).is_none());
        assert!(infix_operator(&TokenKind::Keyword(Keyword::From)).is_none());
        assert!(infix_operator(&TokenKind::Identifier(String::from("x"))).is_none());
        assert!(prefix_operator(&TokenKind::Plus).is_none());
    }
}
