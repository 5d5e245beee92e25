use bizdash_types::EntityId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::ModelResult;

/// A uniquely identified record synchronized by a store.
///
/// `id` and `created_at` are assigned by the backend. Everything a client
/// may send on create lives in [`Record::Draft`]; everything it may change
/// later lives in [`Record::Patch`].
pub trait Record:
    Clone + PartialEq + Send + Sync + Serialize + DeserializeOwned + std::fmt::Debug + 'static
{
    /// Entity family name. Doubles as the remote table name.
    const FAMILY: &'static str;

    /// Fields supplied on create.
    type Draft: Clone + Send + Sync + Serialize + DeserializeOwned + std::fmt::Debug + 'static;

    /// Partial update; every field optional.
    type Patch: Clone
        + Default
        + Send
        + Sync
        + Serialize
        + DeserializeOwned
        + std::fmt::Debug
        + 'static;

    fn id(&self) -> &EntityId;

    fn created_at(&self) -> DateTime<Utc>;

    /// Builds the record a backend would materialize from a draft.
    fn from_draft(id: EntityId, draft: Self::Draft, created_at: DateTime<Utc>) -> Self;

    /// Applies the set fields of `patch` in place.
    fn apply_patch(&mut self, patch: &Self::Patch);

    /// Checks record invariants. Called on every decoded row and on
    /// every record an in-memory backend materializes.
    fn validate(&self) -> ModelResult<()> {
        Ok(())
    }
}
