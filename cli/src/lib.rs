//! Shared pieces of the `bizdash` command-line tool: configuration loading
//! and plain-text rendering of store projections.

mod config;
mod render;

pub use config::{AppConfig, ENV_API_KEY, ENV_BASE_URL};
pub use render::{render_catalog, render_facts, render_finance, render_leads, render_pipeline};
