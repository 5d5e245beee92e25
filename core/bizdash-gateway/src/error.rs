//! Error types for the gateway layer.

use bizdash_model::ModelError;
use bizdash_types::EntityId;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors a remote call can fail with.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure (connection refused, reset, DNS).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Http { status: u16, message: String },

    /// Missing, expired or rejected credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Update/delete target does not exist on the backend.
    #[error("{family} record not found: {id}")]
    NotFound { family: &'static str, id: EntityId },

    /// The backend rejected the payload.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A response row failed the decode/validate boundary.
    #[error("decode error: {0}")]
    Decode(#[from] ModelError),

    /// The response was well-formed JSON with an unexpected shape.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Timeout.
    #[error("operation timed out")]
    Timeout,

    /// Invalid gateway configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GatewayError::NotFound { .. })
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Timeout
        } else if e.is_decode() {
            GatewayError::Protocol(e.to_string())
        } else if let Some(status) = e.status() {
            GatewayError::Http {
                status: status.as_u16(),
                message: e.to_string(),
            }
        } else {
            GatewayError::Network(e.to_string())
        }
    }
}
