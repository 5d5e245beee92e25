use anyhow::{Context, Result};
use bizdash_gateway::GatewayConfig;
use bizdash_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Overrides `gateway.api_key`.
pub const ENV_API_KEY: &str = "BIZDASH_API_KEY";
/// Overrides `gateway.base_url`.
pub const ENV_BASE_URL: &str = "BIZDASH_BASE_URL";

/// Top-level configuration file.
///
/// ```json
/// { "gateway": { "base_url": "https://project.example.co", "api_key": "..." },
///   "store": { "update_policy": "refetch" } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub gateway: GatewayConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    /// Reads `path` if given, otherwise starts from defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Applies environment overrides, looked up through `var`.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = var(ENV_API_KEY).filter(|v| !v.is_empty()) {
            self.gateway.api_key = key;
        }
        if let Some(url) = var(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.gateway.base_url = url;
        }
        self
    }
}
