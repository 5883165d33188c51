//! Error types for ragline.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, chat completion, embedding,
//! vector index, and document loading errors.

use thiserror::Error;

/// Unified error type for ragline.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic; errors must be represented and propagated.
///
/// The taxonomy mirrors how failures are handled at the top level:
/// - `Config` errors are fatal and abort startup.
/// - `Chat`, `Embedding` and `Index` errors are remote-call failures; the
///   chat loop reports them and continues. They are never folded into
///   answer text.
/// - `Document` errors require caller action (e.g. point at a folder that
///   actually contains documents).
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors (missing secret, bad chunk settings, ...)
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chat-completion provider errors
    #[error("Chat error: {0}")]
    Chat(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index errors (dimension mismatch, backend failure, ...)
    #[error("Index error: {0}")]
    Index(String),

    /// Document loading errors (no files found, unreadable content, ...)
    #[error("Document error: {0}")]
    Document(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
