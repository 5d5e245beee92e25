//! Core type definitions for bizdash.
//!
//! This crate defines the entity-agnostic types shared by the model,
//! gateway and store crates:
//! - Opaque, server-assigned entity identifiers
//!
//! All domain-specific records (leads, transactions, memory facts, etc.)
//! live in `bizdash-model`, not here.

mod ids;

pub use ids::EntityId;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid entity id: {0:?}")]
    InvalidId(String),
}
