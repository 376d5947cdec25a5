//! Error types for input validation.

use thiserror::Error;

/// Errors raised when caller-supplied input violates a constraint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The category is longer than allowed.
    #[error("category must be {max} characters or less, got {len}")]
    CategoryTooLong { len: usize, max: usize },

    /// The prefix is longer than allowed.
    #[error("prefix must be {max} characters or less, got {len}")]
    PrefixTooLong { len: usize, max: usize },

    /// The prefix contains a non-alphanumeric character or is empty.
    #[error("prefix must be alphanumeric, got '{prefix}'")]
    PrefixNotAlphanumeric { prefix: String },

    /// A prefix was supplied for a scheme that does not carry one.
    #[error("prefix is only supported for timestamp identifiers, not '{scheme}'")]
    PrefixNotSupported { scheme: String },

    /// The scheme name is not one of the known schemes.
    #[error("unknown identifier scheme '{0}': expected v1, v4 or timestamp")]
    UnknownScheme(String),
}
