//! Error types for store operations.

use bizdash_gateway::GatewayError;
use thiserror::Error;

use crate::Operation;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of a store operation, reported once to its caller.
///
/// Stores keep no error field; after any of these the store is back in
/// `Ready` (or still `Uninitialized`).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The remote call failed. Covers missing update/delete targets too.
    #[error("{operation} on {family} failed: {source}")]
    Remote {
        family: &'static str,
        operation: Operation,
        #[source]
        source: GatewayError,
    },

    /// The identity check has not settled yet; nothing was sent.
    #[error("{family}: identity check still in progress")]
    AuthPending { family: &'static str },

    /// No signed-in user; nothing was sent.
    #[error("{family}: not signed in")]
    Unauthenticated { family: &'static str },
}

impl StoreError {
    /// The underlying gateway error, for remote failures.
    pub fn gateway_error(&self) -> Option<&GatewayError> {
        match self {
            StoreError::Remote { source, .. } => Some(source),
            _ => None,
        }
    }
}
