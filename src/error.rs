// Copyright (c) 2018 Fabian Schuiki

//! Errors produced while building grammars and automata.

use std;
use std::collections::TryReserveError;
use std::fmt;

/// An error that occurred during grammar or automaton construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Growing a table or allocating a node failed.
    AllocationFailure,
    /// An equal element is already present in a table. Carries the index of
    /// the element that is already stored.
    AlreadyExists(usize),
    /// A rule was attached to a symbol other than its left-hand side.
    GrammarMismatch {
        /// The name of the rule's left-hand side.
        rule: String,
        /// The name of the symbol the rule was attached to.
        symbol: String,
    },
    /// An item's marker lies beyond the end of its rule.
    PositionOutOfRange {
        /// The rule the item refers to.
        rule: String,
        /// The requested marker position.
        pos: usize,
        /// The number of symbols in the rule.
        len: usize,
    },
    /// A grammar description could not be parsed.
    Syntax {
        /// Byte offset into the description.
        offset: usize,
        /// What went wrong.
        message: String,
    },
}

/// The result of a fallible construction step.
pub type Result<T> = std::result::Result<T, Error>;

impl From<TryReserveError> for Error {
    fn from(_: TryReserveError) -> Error {
        Error::AllocationFailure
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::AllocationFailure => write!(f, "memory allocation failed"),
            Error::AlreadyExists(index) => write!(f, "element already exists at index {}", index),
            Error::GrammarMismatch {
                ref rule,
                ref symbol,
            } => write!(
                f,
                "rule for `{}` cannot be attached to symbol `{}`",
                rule, symbol
            ),
            Error::PositionOutOfRange {
                ref rule,
                pos,
                len,
            } => write!(
                f,
                "position {} is beyond the end of rule `{}` of length {}",
                pos, rule, len
            ),
            Error::Syntax {
                offset,
                ref message,
            } => write!(f, "syntax error at byte {}: {}", offset, message),
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reservation_is_allocation_failure() {
        let mut v: Vec<u8> = Vec::new();
        let err = v.try_reserve(std::usize::MAX).unwrap_err();
        assert_eq!(Error::from(err), Error::AllocationFailure);
    }

    #[test]
    fn display() {
        assert_eq!(
            format!("{}", Error::AllocationFailure),
            "memory allocation failed"
        );
        assert_eq!(
            format!("{}", Error::AlreadyExists(3)),
            "element already exists at index 3"
        );
        assert_eq!(
            format!(
                "{}",
                Error::GrammarMismatch {
                    rule: "A".into(),
                    symbol: "B".into(),
                }
            ),
            "rule for `A` cannot be attached to symbol `B`"
        );
        assert_eq!(
            format!(
                "{}",
                Error::PositionOutOfRange {
                    rule: "A → x".into(),
                    pos: 2,
                    len: 1,
                }
            ),
            "position 2 is beyond the end of rule `A → x` of length 1"
        );
        assert_eq!(
            format!(
                "{}",
                Error::Syntax {
                    offset: 7,
                    message: "expected `;`".into(),
                }
            ),
            "syntax error at byte 7: expected `;`"
        );
    }
}
