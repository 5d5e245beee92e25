//! Gateway contracts.

use async_trait::async_trait;
use bizdash_model::{Credentials, Record, Session};
use bizdash_types::EntityId;

use crate::GatewayResult;

/// CRUD access to one entity family on the backend.
///
/// All calls may suspend and may fail; timeouts are the implementation's
/// concern. `list` order is the backend's (newest first for both shipped
/// backends).
#[async_trait]
pub trait RemoteGateway<E: Record>: Send + Sync {
    /// Returns every record of the family.
    async fn list(&self) -> GatewayResult<Vec<E>>;

    /// Creates a record and returns it with server-assigned fields filled in.
    async fn create(&self, draft: E::Draft) -> GatewayResult<E>;

    /// Applies `patch` to the record and returns its canonical state.
    async fn update(&self, id: &EntityId, patch: E::Patch) -> GatewayResult<E>;

    /// Deletes the record.
    async fn delete(&self, id: &EntityId) -> GatewayResult<()>;
}

/// Session management against the identity backend.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    /// Returns the session the backend still considers valid, if any.
    async fn current_session(&self) -> GatewayResult<Option<Session>>;

    async fn sign_in(&self, credentials: &Credentials) -> GatewayResult<Session>;

    async fn sign_out(&self) -> GatewayResult<()>;
}
