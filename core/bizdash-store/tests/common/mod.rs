#![allow(dead_code)]

use async_trait::async_trait;
use bizdash_gateway::{GatewayError, GatewayResult, InMemoryGateway, RemoteGateway};
use bizdash_model::{EntityId, MemoryCategory, MemoryFact, Record};
use bizdash_store::{GateState, IdentityGate};
use chrono::{TimeZone, Utc};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub fn id(s: &str) -> EntityId {
    EntityId::parse(s).unwrap()
}

pub fn fact(id_str: &str, category: MemoryCategory, content: &str) -> MemoryFact {
    MemoryFact {
        id: id(id_str),
        category,
        content: content.to_string(),
        created_at: Utc.with_ymd_and_hms(2026, 2, 1, 9, 0, 0).unwrap(),
    }
}

pub fn ids<E: Record>(records: &[E]) -> Vec<String> {
    records.iter().map(|r| r.id().to_string()).collect()
}

/// `list` calls park until the test resolves them, in any order.
/// Mutations go to an in-memory backend.
pub struct ScriptedGateway<E: Record> {
    pending: Mutex<Vec<Option<oneshot::Sender<GatewayResult<Vec<E>>>>>>,
    pub backend: InMemoryGateway<E>,
}

impl<E: Record> ScriptedGateway<E> {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            backend: InMemoryGateway::new(),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Yields until `n` list calls have been issued.
    pub async fn wait_for_list_calls(&self, n: usize) {
        while self.list_calls() < n {
            tokio::task::yield_now().await;
        }
    }

    /// Completes the `index`-th list call (0-based).
    pub fn resolve(&self, index: usize, result: GatewayResult<Vec<E>>) {
        let sender = self.pending.lock().unwrap()[index]
            .take()
            .expect("list call already resolved");
        let _ = sender.send(result);
    }
}

#[async_trait]
impl<E: Record> RemoteGateway<E> for ScriptedGateway<E> {
    async fn list(&self) -> GatewayResult<Vec<E>> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push(Some(tx));
        rx.await
            .unwrap_or_else(|_| Err(GatewayError::Network("response dropped".into())))
    }

    async fn create(&self, draft: E::Draft) -> GatewayResult<E> {
        self.backend.create(draft).await
    }

    async fn update(&self, id: &EntityId, patch: E::Patch) -> GatewayResult<E> {
        self.backend.update(id, patch).await
    }

    async fn delete(&self, id: &EntityId) -> GatewayResult<()> {
        self.backend.delete(id).await
    }
}

/// Identity gate whose flags a test flips directly.
pub struct FixedGate(pub Mutex<GateState>);

impl FixedGate {
    pub fn new(is_authenticated: bool, loading: bool) -> Self {
        Self(Mutex::new(GateState {
            is_authenticated,
            loading,
        }))
    }

    pub fn set(&self, is_authenticated: bool, loading: bool) {
        *self.0.lock().unwrap() = GateState {
            is_authenticated,
            loading,
        };
    }
}

impl IdentityGate for FixedGate {
    fn gate_state(&self) -> GateState {
        *self.0.lock().unwrap()
    }
}
