//! Common error types for PACW

use thiserror::Error;

/// Common result type for PACW operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the case workspace engine
///
/// The variants mirror the failure taxonomy of the case service:
/// missing credentials are a local precondition failure, not-found is
/// distinct from transport failure, and rejected writes carry the
/// server's own detail message.
#[derive(Error, Debug)]
pub enum Error {
    /// Caller holds no valid credential; checked before any request is sent
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Write rejected by the server (validation or conflict); never retried
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network-level failure; prior local state is preserved unchanged
    #[error("Transport error: {0}")]
    Transport(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
