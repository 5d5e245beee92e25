//! Client-side entity stores for bizdash.
//!
//! Each [`Store`] owns one authoritative in-memory collection for one entity
//! family and keeps it synchronized with a [`RemoteGateway`].
//!
//! # Architecture
//!
//! - **Store Core** ([`Store`]): `fetch_all` / `add` / `update` / `remove`
//!   with consistent loading and error semantics
//! - **Snapshots** ([`StoreSnapshot`]): immutable, cheap-to-clone views; the only
//!   thing consumers ever see
//! - **Events** ([`StoreEvent`]): broadcast notifications of state changes and
//!   one-shot failure reports
//! - **Projections** ([`Projection`]): pure read-only views computed on demand
//! - **Auth** ([`AuthStore`], [`NavigationGuard`]): session state and the
//!   `is_authenticated` / `loading` gate
//! - **Session** ([`DashboardSession`]): one instance of every store per
//!   signed-in session, with global reset
//!
//! ## Reconciliation
//!
//! | Operation | On success |
//! |---|---|
//! | `fetch_all` | full replace with the gateway's list |
//! | `add` | refetch |
//! | `update` | splice the returned record, or refetch ([`UpdatePolicy`]) |
//! | `remove` | evict locally |
//!
//! On failure the collection is untouched and `loading` still clears.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use bizdash_gateway::InMemoryGateway;
//! use bizdash_model::{MemoryCategory, MemoryFact};
//! use bizdash_store::{Store, StoreConfig};
//!
//! # tokio_test::block_on(async {
//! let store = Store::<MemoryFact>::new(Arc::new(InMemoryGateway::new()), StoreConfig::default());
//! store.add_fact("Focus on churn", Some(MemoryCategory::Strategy)).await.unwrap();
//! assert!(store.memory_prompt().contains("[STRATEGY] Focus on churn"));
//! # });
//! ```
//!
//! [`RemoteGateway`]: bizdash_gateway::RemoteGateway

mod auth;
mod config;
mod error;
mod event;
mod memory;
mod projection;
pub mod projections;
mod session;
mod state;
mod store;

pub use auth::{AuthStore, GateState, GuardDecision, IdentityGate, NavigationGuard};
pub use config::{FetchOrdering, StoreConfig, UpdatePolicy};
pub use error::{StoreError, StoreResult};
pub use event::{Operation, StoreEvent, StoreEvents};
pub use projection::Projection;
pub use session::{DashboardSession, GatewaySet, Resettable};
pub use state::{StoreSnapshot, StoreStatus};
pub use store::Store;
