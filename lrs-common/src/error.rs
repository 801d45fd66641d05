//! Common error types for LRS

use thiserror::Error;

/// Common result type for LRS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across LRS crates
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A hop of a supervisory hierarchy walk failed; no partial scope is returned
    #[error("Scope resolution failed: {0}")]
    ScopeResolution(#[source] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found, or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Caller's role does not permit the operation
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

