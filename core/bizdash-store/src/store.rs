//! The Store Core: one authoritative collection per entity family.
//!
//! State lives behind a synchronous lock that is never held across an
//! await, so consumers read snapshots without suspending and never see a
//! half-applied transition. Remote calls happen outside the lock.

use bizdash_gateway::{GatewayError, RemoteGateway};
use bizdash_model::Record;
use bizdash_types::EntityId;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::auth::IdentityGate;
use crate::session::Resettable;
use crate::state::{StoreSnapshot, StoreState, StoreStatus};
use crate::{
    FetchOrdering, Operation, Projection, StoreConfig, StoreError, StoreEvent, StoreEvents,
    StoreResult, UpdatePolicy,
};

/// A collection of `E` synchronized with a [`RemoteGateway`].
pub struct Store<E: Record> {
    gateway: Arc<dyn RemoteGateway<E>>,
    config: StoreConfig,
    state: RwLock<StoreState<E>>,
    events: broadcast::Sender<StoreEvent>,
    identity: Option<Arc<dyn IdentityGate>>,
}

/// One in-flight remote operation. Keeps `loading` raised until it is
/// settled or dropped, whichever comes first.
struct InFlight<'a, E: Record> {
    store: &'a Store<E>,
    epoch: u64,
    fetch_seq: Option<u64>,
    settled: bool,
}

impl<E: Record> InFlight<'_, E> {
    /// Applies `change` and lowers this operation's loading contribution in
    /// one transition. Dropped without effect if the store was reset meanwhile.
    fn settle(mut self, change: impl FnOnce(&mut StoreState<E>)) {
        self.settled = true;
        let epoch = self.epoch;
        self.store.transition(|state| {
            if state.epoch == epoch {
                change(state);
                state.in_flight = state.in_flight.saturating_sub(1);
            }
        });
    }
}

impl<E: Record> Drop for InFlight<'_, E> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let epoch = self.epoch;
        self.store.transition(|state| {
            if state.epoch == epoch {
                state.in_flight = state.in_flight.saturating_sub(1);
            }
        });
    }
}

impl<E: Record> Store<E> {
    pub fn new(gateway: Arc<dyn RemoteGateway<E>>, config: StoreConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            gateway,
            config,
            state: RwLock::new(StoreState::new()),
            events,
            identity: None,
        }
    }

    /// Refuses every operation unless `gate` reports a settled, signed-in user.
    pub fn requires_identity(mut self, gate: Arc<dyn IdentityGate>) -> Self {
        self.identity = Some(gate);
        self
    }

    pub fn family(&self) -> &'static str {
        E::FAMILY
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // ── Consumer read contract ───────────────────────────────────

    /// Current state. Never blocks on network activity.
    pub fn snapshot(&self) -> StoreSnapshot<E> {
        self.read().snapshot()
    }

    pub fn collection(&self) -> Arc<[E]> {
        self.read().collection.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read().in_flight > 0
    }

    pub fn is_initialized(&self) -> bool {
        self.read().initialized
    }

    pub fn status(&self) -> StoreStatus {
        self.snapshot().status()
    }

    pub fn get(&self, id: &EntityId) -> Option<E> {
        self.read().collection.iter().find(|r| r.id() == id).cloned()
    }

    /// Computes `projection` over the current collection.
    pub fn project<P: Projection<E>>(&self, projection: &P) -> P::Output {
        let collection = self.collection();
        projection.project(&collection)
    }

    /// Change notifications from now on.
    pub fn subscribe(&self) -> StoreEvents {
        self.events.subscribe()
    }

    // ── Operations ───────────────────────────────────────────────

    /// Replaces the collection with the gateway's list.
    ///
    /// Overlapping calls all run to completion; which response wins is
    /// governed by [`FetchOrdering`].
    pub async fn fetch_all(&self) -> StoreResult<()> {
        self.check_identity()?;
        let op = self.begin(true);
        self.run_fetch(op).await
    }

    /// Refetch on behalf of a mutation started in `epoch`. Skipped when the
    /// store has been reset since.
    async fn refetch(&self, epoch: u64) -> StoreResult<()> {
        self.check_identity()?;
        match self.begin_in(epoch) {
            Some(op) => self.run_fetch(op).await,
            None => {
                debug!(family = E::FAMILY, "store reset mid-operation; refetch skipped");
                Ok(())
            }
        }
    }

    async fn run_fetch(&self, op: InFlight<'_, E>) -> StoreResult<()> {
        let seq = op.fetch_seq.unwrap_or_default();
        debug!(family = E::FAMILY, seq, "fetching collection");

        match self.gateway.list().await {
            Ok(rows) => {
                let ordering = self.config.fetch_ordering;
                let count = rows.len();
                op.settle(|state| {
                    if ordering == FetchOrdering::LatestIssued && seq < state.applied_fetch {
                        debug!(family = E::FAMILY, seq, "discarding stale fetch response");
                        return;
                    }
                    state.applied_fetch = state.applied_fetch.max(seq);
                    state.replace_all(rows);
                });
                debug!(family = E::FAMILY, seq, count, "fetch complete");
                Ok(())
            }
            Err(e) => {
                drop(op);
                Err(self.fail(Operation::Fetch, e))
            }
        }
    }

    /// Creates a record remotely, then refetches so the collection carries
    /// every server-assigned field. Nothing is inserted optimistically.
    pub async fn add(&self, draft: E::Draft) -> StoreResult<()> {
        self.check_identity()?;
        let op = self.begin(false);

        match self.gateway.create(draft).await {
            Ok(created) => {
                debug!(family = E::FAMILY, id = %created.id(), "created; refetching");
                let refetched = self.refetch(op.epoch).await;
                drop(op);
                refetched
            }
            Err(e) => {
                drop(op);
                Err(self.fail(Operation::Add, e))
            }
        }
    }

    /// Updates a record remotely and reconciles per [`UpdatePolicy`].
    ///
    /// An `id` missing from the local collection is not an error here; the
    /// gateway decides whether the record exists.
    pub async fn update(&self, id: &EntityId, patch: E::Patch) -> StoreResult<()> {
        self.check_identity()?;
        let op = self.begin(false);

        match self.gateway.update(id, patch).await {
            Ok(canonical) => match self.config.update_policy {
                UpdatePolicy::ReplaceReturned => {
                    op.settle(|state| state.replace_record(canonical));
                    Ok(())
                }
                UpdatePolicy::Refetch => {
                    let refetched = self.refetch(op.epoch).await;
                    drop(op);
                    refetched
                }
            },
            Err(e) => {
                drop(op);
                Err(self.fail(Operation::Update, e))
            }
        }
    }

    /// Deletes a record remotely, then evicts it locally.
    pub async fn remove(&self, id: &EntityId) -> StoreResult<()> {
        self.check_identity()?;
        let op = self.begin(false);

        match self.gateway.delete(id).await {
            Ok(()) => {
                op.settle(|state| state.evict(id));
                debug!(family = E::FAMILY, %id, "removed");
                Ok(())
            }
            Err(e) => {
                drop(op);
                Err(self.fail(Operation::Remove, e))
            }
        }
    }

    /// Empties the collection and returns to `Uninitialized`. Responses to
    /// operations started before the reset are ignored when they arrive.
    pub fn reset(&self) {
        let version = {
            let mut state = self.write();
            state.clear();
            state.version += 1;
            state.version
        };
        debug!(family = E::FAMILY, version, "store reset");
        let _ = self.events.send(StoreEvent::Reset { family: E::FAMILY });
    }

    // ── Internals ────────────────────────────────────────────────

    fn read(&self) -> RwLockReadGuard<'_, StoreState<E>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState<E>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_identity(&self) -> StoreResult<()> {
        let Some(gate) = &self.identity else {
            return Ok(());
        };
        let gate = gate.gate_state();
        if gate.loading {
            return Err(StoreError::AuthPending { family: E::FAMILY });
        }
        if !gate.is_authenticated {
            return Err(StoreError::Unauthenticated { family: E::FAMILY });
        }
        Ok(())
    }

    fn begin(&self, is_fetch: bool) -> InFlight<'_, E> {
        let mut fetch_seq = None;
        let mut epoch = 0;
        self.transition(|state| {
            fetch_seq = state.enter(is_fetch);
            epoch = state.epoch;
        });
        InFlight {
            store: self,
            epoch,
            fetch_seq,
            settled: false,
        }
    }

    /// Starts a fetch only if the store is still in `epoch`.
    fn begin_in(&self, epoch: u64) -> Option<InFlight<'_, E>> {
        let (fetch_seq, version) = {
            let mut state = self.write();
            if state.epoch != epoch {
                return None;
            }
            let fetch_seq = state.enter(true);
            state.version += 1;
            (fetch_seq, state.version)
        };
        self.notify(version);
        Some(InFlight {
            store: self,
            epoch,
            fetch_seq,
            settled: false,
        })
    }

    /// Applies `change` under the write lock, bumps the version and notifies.
    fn transition(&self, change: impl FnOnce(&mut StoreState<E>)) {
        let version = {
            let mut state = self.write();
            change(&mut state);
            state.version += 1;
            state.version
        };
        self.notify(version);
    }

    fn notify(&self, version: u64) {
        let _ = self.events.send(StoreEvent::Changed {
            family: E::FAMILY,
            version,
        });
    }

    fn fail(&self, operation: Operation, source: GatewayError) -> StoreError {
        warn!(family = E::FAMILY, %operation, error = %source, "remote operation failed");
        let _ = self.events.send(StoreEvent::Failed {
            family: E::FAMILY,
            operation,
            message: source.to_string(),
        });
        StoreError::Remote {
            family: E::FAMILY,
            operation,
            source,
        }
    }
}

impl<E: Record> Resettable for Store<E> {
    fn family(&self) -> &'static str {
        E::FAMILY
    }

    fn reset(&self) {
        Store::reset(self);
    }
}
