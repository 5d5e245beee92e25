//! In-process backend.
//!
//! Holds server truth in memory with the same contract as the REST backend:
//! server-assigned ids and timestamps, newest-first listing, `NotFound` on
//! mutation of an absent id. Latency and one-shot faults can be injected.

use async_trait::async_trait;
use bizdash_model::{Credentials, Record, Session, UserProfile};
use bizdash_types::EntityId;
use chrono::{Duration as ChronoDuration, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tracing::debug;

use crate::gateway::{AuthGateway, RemoteGateway};
use crate::{GatewayError, GatewayResult};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Per-operation call counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GatewayCalls {
    pub list: usize,
    pub create: usize,
    pub update: usize,
    pub delete: usize,
}

#[derive(Default)]
struct Counters {
    list: AtomicUsize,
    create: AtomicUsize,
    update: AtomicUsize,
    delete: AtomicUsize,
}

/// In-memory [`RemoteGateway`] for one entity family.
pub struct InMemoryGateway<E: Record> {
    /// Newest first.
    rows: Mutex<Vec<E>>,
    faults: Mutex<VecDeque<GatewayError>>,
    latency: Option<Duration>,
    counters: Counters,
}

impl<E: Record> InMemoryGateway<E> {
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// Seeds the backend. `rows` is taken as already newest-first.
    pub fn with_rows(rows: Vec<E>) -> Self {
        Self {
            rows: Mutex::new(rows),
            faults: Mutex::new(VecDeque::new()),
            latency: None,
            counters: Counters::default(),
        }
    }

    /// Delays every call by `latency` before it touches server state.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next call (of any kind) fail with `error`. Faults queue up.
    pub fn fail_next(&self, error: GatewayError) {
        lock(&self.faults).push_back(error);
    }

    /// Current server-side rows.
    pub fn rows(&self) -> Vec<E> {
        lock(&self.rows).clone()
    }

    /// Replaces server-side rows, as another session writing would.
    pub fn set_rows(&self, rows: Vec<E>) {
        *lock(&self.rows) = rows;
    }

    pub fn calls(&self) -> GatewayCalls {
        GatewayCalls {
            list: self.counters.list.load(Ordering::SeqCst),
            create: self.counters.create.load(Ordering::SeqCst),
            update: self.counters.update.load(Ordering::SeqCst),
            delete: self.counters.delete.load(Ordering::SeqCst),
        }
    }

    async fn begin(&self, counter: &AtomicUsize) -> GatewayResult<()> {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match lock(&self.faults).pop_front() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl<E: Record> Default for InMemoryGateway<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Record> RemoteGateway<E> for InMemoryGateway<E> {
    async fn list(&self) -> GatewayResult<Vec<E>> {
        self.begin(&self.counters.list).await?;
        Ok(self.rows())
    }

    async fn create(&self, draft: E::Draft) -> GatewayResult<E> {
        self.begin(&self.counters.create).await?;
        let record = E::from_draft(EntityId::generate(), draft, Utc::now());
        record
            .validate()
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        debug!(family = E::FAMILY, id = %record.id(), "in-memory create");
        lock(&self.rows).insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: &EntityId, patch: E::Patch) -> GatewayResult<E> {
        self.begin(&self.counters.update).await?;
        let mut rows = lock(&self.rows);
        let row = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| GatewayError::NotFound {
                family: E::FAMILY,
                id: id.clone(),
            })?;
        let mut updated = row.clone();
        updated.apply_patch(&patch);
        updated
            .validate()
            .map_err(|e| GatewayError::Validation(e.to_string()))?;
        *row = updated.clone();
        Ok(updated)
    }

    async fn delete(&self, id: &EntityId) -> GatewayResult<()> {
        self.begin(&self.counters.delete).await?;
        let mut rows = lock(&self.rows);
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(GatewayError::NotFound {
                family: E::FAMILY,
                id: id.clone(),
            });
        }
        Ok(())
    }
}

struct Account {
    password: String,
    profile: UserProfile,
}

/// In-memory [`AuthGateway`] with a fixed set of accounts.
pub struct InMemoryAuthGateway {
    accounts: HashMap<String, Account>,
    current: Mutex<Option<Session>>,
    faults: Mutex<VecDeque<GatewayError>>,
    latency: Option<Duration>,
}

impl InMemoryAuthGateway {
    pub fn new() -> Self {
        Self {
            accounts: HashMap::new(),
            current: Mutex::new(None),
            faults: Mutex::new(VecDeque::new()),
            latency: None,
        }
    }

    /// Registers an account that can sign in with `password`.
    pub fn with_account(mut self, email: &str, password: &str, display_name: Option<&str>) -> Self {
        let profile = UserProfile {
            id: EntityId::generate(),
            email: email.to_string(),
            display_name: display_name.map(str::to_string),
        };
        self.accounts.insert(
            email.to_ascii_lowercase(),
            Account {
                password: password.to_string(),
                profile,
            },
        );
        self
    }

    /// Starts with an already-established session, as after a page reload.
    pub fn with_session(self, session: Session) -> Self {
        *lock(&self.current) = Some(session);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn fail_next(&self, error: GatewayError) {
        lock(&self.faults).push_back(error);
    }

    async fn begin(&self) -> GatewayResult<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match lock(&self.faults).pop_front() {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

impl Default for InMemoryAuthGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn current_session(&self) -> GatewayResult<Option<Session>> {
        self.begin().await?;
        let mut current = lock(&self.current);
        if current.as_ref().is_some_and(|s| s.is_expired(Utc::now())) {
            *current = None;
        }
        Ok(current.clone())
    }

    async fn sign_in(&self, credentials: &Credentials) -> GatewayResult<Session> {
        self.begin().await?;
        let account = self
            .accounts
            .get(&credentials.email.to_ascii_lowercase())
            .filter(|a| a.password == credentials.password)
            .ok_or_else(|| GatewayError::Unauthorized("invalid login credentials".to_string()))?;

        let session = Session {
            user: account.profile.clone(),
            access_token: EntityId::generate().into_inner(),
            expires_at: Some(Utc::now() + ChronoDuration::hours(1)),
        };
        *lock(&self.current) = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> GatewayResult<()> {
        self.begin().await?;
        *lock(&self.current) = None;
        Ok(())
    }
}
