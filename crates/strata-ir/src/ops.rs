//! Shared error type for typed op wrappers.

use derive_more::Display;

/// Error when viewing an operation as a dialect-specific wrapper.
#[derive(Clone, Debug, Display, PartialEq, Eq)]
pub enum ConversionError {
    /// Operation name doesn't match expected dialect.operation.
    #[display("expected {expected}, found {actual}")]
    WrongOperation {
        expected: &'static str,
        actual: String,
    },
    /// The operation has fewer regions than its wrapper requires.
    #[display("{_0}: missing region")]
    MissingRegion(&'static str),
    /// The operation has fewer successors than its wrapper requires.
    #[display("{_0}: missing successor")]
    MissingSuccessor(&'static str),
    /// The operation has fewer operands than its wrapper requires.
    #[display("{_0}: missing operand")]
    MissingOperand(&'static str),
}

impl std::error::Error for ConversionError {}
