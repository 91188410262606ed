//! Error types for the memverse core library.

use thiserror::Error;

/// Top-level error type for all memverse core operations.
#[derive(Error, Debug)]
pub enum VerseError {
    /// A memory date could not be parsed as `YYYY-MM-DD`.
    #[error("Invalid memory date '{input}': {reason}")]
    InvalidDate {
        /// The rejected input.
        input: String,
        /// Parser message.
        reason: String,
    },

    /// A memory with this ID is already on the timeline.
    #[error("Duplicate memory id '{0}'")]
    DuplicateMemory(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, VerseError>;
