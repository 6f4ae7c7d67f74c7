//! Error types for the quotagate service.

use thiserror::Error;

/// Main error type for quotagate operations.
#[derive(Error, Debug)]
pub enum QuotagateError {
    /// Configuration-related errors, fatal at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Counter store errors; the limiter fails open on these
    #[error("Counter store error: {0}")]
    Store(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for quotagate operations.
pub type Result<T> = std::result::Result<T, QuotagateError>;
