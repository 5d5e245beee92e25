use serde::{Deserialize, Serialize};

/// Which response wins when `fetch_all` calls overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchOrdering {
    /// The last response to arrive replaces the collection.
    #[default]
    LastCompleted,
    /// Responses to calls issued before an already-applied one are discarded.
    LatestIssued,
}

/// How a successful `update` is reconciled into the collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePolicy {
    /// Replace the local record with the canonical one the gateway returned.
    #[default]
    ReplaceReturned,
    /// Run a full `fetch_all`.
    Refetch,
}

/// Configuration for a store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Capacity of the change-event broadcast channel.
    pub event_capacity: usize,
    pub fetch_ordering: FetchOrdering,
    pub update_policy: UpdatePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            event_capacity: 64,
            fetch_ordering: FetchOrdering::default(),
            update_policy: UpdatePolicy::default(),
        }
    }
}
