//! Remote gateways for bizdash.
//!
//! A gateway is the thin async CRUD interface a store synchronizes
//! against, one per entity family:
//! - [`RemoteGateway`] - `list` / `create` / `update` / `delete` for a [`Record`] type
//! - [`AuthGateway`] - session restore, sign-in and sign-out
//!
//! Two backends ship with the crate:
//! - [`memory`] - server truth held in process, with latency and fault injection
//! - [`http`] - a REST table API plus token auth over `reqwest`
//!
//! Every row a gateway returns has passed through
//! [`bizdash_model::decode_row`]; stores never see raw wire shapes.
//!
//! [`Record`]: bizdash_model::Record

mod config;
mod error;
mod gateway;
pub mod http;
pub mod memory;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult};
pub use gateway::{AuthGateway, RemoteGateway};
pub use http::{HttpAuthGateway, HttpBackend, HttpGateway};
pub use memory::{GatewayCalls, InMemoryAuthGateway, InMemoryGateway};
