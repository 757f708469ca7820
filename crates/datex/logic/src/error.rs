use std::fmt;

use thiserror::Error;

/// Errors from the clause matcher and collapse normalizer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogicError {
    #[error("could not infer a valid atomic type for the match check")]
    CannotInferComparator,

    #[error("atomic type {0} does not implement logical matching")]
    MissingComparator(String),

    #[error("invalid {position} check: atomic value has wrong type (expected {expected}, found {found})")]
    AtomTypeMismatch {
        position: ClausePosition,
        expected: String,
        found: String,
    },

    #[error("assertions cannot be evaluated in {0}")]
    UnsupportedAssertion(ClausePosition),

    #[error("async assertion cannot be evaluated in a logical connective")]
    PendingAssertion,

    #[error("assertion failed: {0}")]
    Assertion(#[from] AssertionFailure),
}

/// Where in a clause evaluation an error arose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ClausePosition {
    /// The clause being tested.
    Value,
    /// The clause it is tested against.
    Against,
    /// A clause being collapsed.
    Collapse,
}

impl fmt::Display for ClausePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClausePosition::Value => f.write_str("match"),
            ClausePosition::Against => f.write_str("match target"),
            ClausePosition::Collapse => f.write_str("logical collapse"),
        }
    }
}

/// Failure reported by an assertion predicate.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssertionFailure {
    #[error("{0} is false")]
    False(String),

    #[error("{0}")]
    Reason(String),

    #[error("invalid assertion result: expected a boolean, a text or no result, found {0}")]
    InvalidResult(String),
}
