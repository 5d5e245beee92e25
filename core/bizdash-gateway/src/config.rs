use serde::{Deserialize, Serialize};

/// Connection settings for the REST backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Backend root, e.g. `https://project.example.co`. No trailing slash needed.
    pub base_url: String,
    /// Public API key sent on every request.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:54321".to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub(crate) fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }
}
