//! Store state and the read-only snapshots handed to consumers.

use bizdash_model::Record;
use bizdash_types::EntityId;
use std::sync::Arc;

use crate::Projection;

/// Coarse lifecycle of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// No fetch has succeeded since creation or the last reset.
    Uninitialized,
    /// At least one remote operation is in flight.
    Loading,
    Ready,
}

/// Immutable view of a store at one version.
///
/// Cloning shares the collection; nothing in a snapshot can be mutated.
#[derive(Debug)]
pub struct StoreSnapshot<E> {
    collection: Arc<[E]>,
    loading: bool,
    initialized: bool,
    version: u64,
}

impl<E> Clone for StoreSnapshot<E> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            loading: self.loading,
            initialized: self.initialized,
            version: self.version,
        }
    }
}

impl<E: Record> StoreSnapshot<E> {
    pub fn collection(&self) -> &[E] {
        &self.collection
    }

    /// Shared handle to the collection, for consumers that outlive the snapshot.
    pub fn shared(&self) -> Arc<[E]> {
        self.collection.clone()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// `true` once a fetch has succeeded. Tells "never loaded" from "no data".
    pub fn initialized(&self) -> bool {
        self.initialized
    }

    /// Monotonic per store; bumps on every state transition.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn status(&self) -> StoreStatus {
        if self.loading {
            StoreStatus::Loading
        } else if self.initialized {
            StoreStatus::Ready
        } else {
            StoreStatus::Uninitialized
        }
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&E> {
        self.collection.iter().find(|r| r.id() == id)
    }

    pub fn project<P: Projection<E>>(&self, projection: &P) -> P::Output {
        projection.project(&self.collection)
    }
}

/// Mutable state behind the store lock.
pub(crate) struct StoreState<E> {
    pub(crate) collection: Arc<[E]>,
    pub(crate) initialized: bool,
    pub(crate) version: u64,
    /// In-flight operations started in the current epoch.
    pub(crate) in_flight: usize,
    /// Bumped by reset; work started in an older epoch is dropped on arrival.
    pub(crate) epoch: u64,
    /// Sequence number of the last issued fetch.
    pub(crate) issued_fetches: u64,
    /// Sequence number of the last fetch whose response was applied.
    pub(crate) applied_fetch: u64,
}

impl<E: Record> StoreState<E> {
    pub(crate) fn new() -> Self {
        Self {
            collection: Arc::from(Vec::new()),
            initialized: false,
            version: 0,
            in_flight: 0,
            epoch: 0,
            issued_fetches: 0,
            applied_fetch: 0,
        }
    }

    pub(crate) fn snapshot(&self) -> StoreSnapshot<E> {
        StoreSnapshot {
            collection: self.collection.clone(),
            loading: self.in_flight > 0,
            initialized: self.initialized,
            version: self.version,
        }
    }

    /// Full replace; never merged with prior contents.
    pub(crate) fn replace_all(&mut self, rows: Vec<E>) {
        self.collection = Arc::from(rows);
        self.initialized = true;
    }

    /// Swaps in `record` where its id matches. Absent ids leave the collection as is.
    pub(crate) fn replace_record(&mut self, record: E) {
        if let Some(pos) = self.collection.iter().position(|r| r.id() == record.id()) {
            let mut rows = self.collection.to_vec();
            rows[pos] = record;
            self.collection = Arc::from(rows);
        }
    }

    /// Drops every record carrying `id`.
    pub(crate) fn evict(&mut self, id: &EntityId) {
        if self.collection.iter().any(|r| r.id() == id) {
            let rows: Vec<E> = self.collection.iter().filter(|r| r.id() != id).cloned().collect();
            self.collection = Arc::from(rows);
        }
    }

    /// Registers one more in-flight operation; fetches also get a sequence number.
    pub(crate) fn enter(&mut self, is_fetch: bool) -> Option<u64> {
        self.in_flight += 1;
        if !is_fetch {
            return None;
        }
        self.issued_fetches += 1;
        Some(self.issued_fetches)
    }

    pub(crate) fn clear(&mut self) {
        self.collection = Arc::from(Vec::new());
        self.initialized = false;
        self.in_flight = 0;
        self.epoch += 1;
        self.applied_fetch = self.issued_fetches;
    }
}
