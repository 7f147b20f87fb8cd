//! Error types for clubchat.
//!
//! These are infrastructure errors (I/O, configuration). User-facing chat
//! errors live in [`crate::chat::CommandError`] and never leave the session
//! that caused them.

use thiserror::Error;

/// Common error type for clubchat.
#[derive(Error, Debug)]
pub enum ChatError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for configuration or input.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for clubchat operations.
pub type Result<T> = std::result::Result<T, ChatError>;
