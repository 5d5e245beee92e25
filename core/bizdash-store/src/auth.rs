//! Authentication store and the navigation gate built on it.
//!
//! The gate exposes exactly two flags, `is_authenticated` and `loading`.
//! `loading` starts out `true` and stays raised until the first restore or
//! sign-in settles, so a guard never redirects before the session is known.

use bizdash_gateway::{AuthGateway, GatewayError};
use bizdash_model::{Credentials, Session, UserProfile};
use chrono::Utc;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::session::Resettable;
use crate::{Operation, StoreError, StoreEvent, StoreEvents, StoreResult};

const FAMILY: &str = "auth";

/// The two flags a navigation guard reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    pub is_authenticated: bool,
    pub loading: bool,
}

/// Anything that can report a [`GateState`] synchronously.
pub trait IdentityGate: Send + Sync {
    fn gate_state(&self) -> GateState;
}

/// What a guarded route should do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Identity unknown: show a neutral waiting state, decide nothing.
    Wait,
    /// Render the protected subtree.
    Render,
    /// Go to the login boundary, coming back to `return_to` afterwards.
    Redirect { login_path: String, return_to: String },
}

/// Route guard for protected pages.
#[derive(Debug, Clone)]
pub struct NavigationGuard {
    login_path: String,
}

impl Default for NavigationGuard {
    fn default() -> Self {
        Self::new("/login")
    }
}

impl NavigationGuard {
    pub fn new(login_path: impl Into<String>) -> Self {
        Self {
            login_path: login_path.into(),
        }
    }

    pub fn decide(&self, gate: GateState, requested: &str) -> GuardDecision {
        if gate.loading {
            return GuardDecision::Wait;
        }
        if gate.is_authenticated {
            return GuardDecision::Render;
        }
        GuardDecision::Redirect {
            login_path: self.login_path.clone(),
            return_to: requested.to_string(),
        }
    }
}

struct AuthState {
    session: Option<Session>,
    in_flight: usize,
    /// Whether the session has been determined at least once.
    settled: bool,
    epoch: u64,
    version: u64,
}

/// An auth call in flight. Dropping it unsettled lowers `loading` without
/// marking the session as determined.
struct Pending<'a> {
    store: &'a AuthStore,
    epoch: u64,
    settled: bool,
}

impl Pending<'_> {
    fn settle(mut self, change: impl FnOnce(&mut AuthState)) {
        self.settled = true;
        self.store.apply(self.epoch, true, change);
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.store.apply(self.epoch, false, |_| {});
        }
    }
}

/// Holds the signed-in session and drives the gate.
pub struct AuthStore {
    gateway: Arc<dyn AuthGateway>,
    state: RwLock<AuthState>,
    events: broadcast::Sender<StoreEvent>,
}

impl AuthStore {
    pub fn new(gateway: Arc<dyn AuthGateway>, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            gateway,
            state: RwLock::new(AuthState {
                session: None,
                in_flight: 0,
                settled: false,
                epoch: 0,
                version: 0,
            }),
            events,
        }
    }

    pub fn session(&self) -> Option<Session> {
        self.read().session.clone()
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read().session.as_ref().map(|s| s.user.clone())
    }

    /// Signed in with a session that has not expired.
    pub fn is_authenticated(&self) -> bool {
        self.read()
            .session
            .as_ref()
            .is_some_and(|s| !s.is_expired(Utc::now()))
    }

    pub fn is_loading(&self) -> bool {
        let state = self.read();
        state.in_flight > 0 || !state.settled
    }

    pub fn subscribe(&self) -> StoreEvents {
        self.events.subscribe()
    }

    /// Asks the backend for a still-valid session, e.g. at startup.
    ///
    /// A failed restore settles the gate as signed out.
    pub async fn restore(&self) -> StoreResult<()> {
        let pending = self.begin();
        match self.gateway.current_session().await {
            Ok(session) => {
                pending.settle(|state| state.session = session);
                Ok(())
            }
            Err(e) => {
                pending.settle(|_| {});
                Err(self.fail(Operation::Restore, e))
            }
        }
    }

    /// Signs in. On failure any existing session is kept.
    pub async fn sign_in(&self, credentials: &Credentials) -> StoreResult<()> {
        let pending = self.begin();
        match self.gateway.sign_in(credentials).await {
            Ok(session) => {
                info!(user = %session.user.id, "session established");
                pending.settle(|state| state.session = Some(session));
                Ok(())
            }
            Err(e) => {
                pending.settle(|_| {});
                Err(self.fail(Operation::SignIn, e))
            }
        }
    }

    /// Signs out remotely. The local session is dropped either way.
    pub async fn sign_out(&self) -> StoreResult<()> {
        let pending = self.begin();
        let result = self.gateway.sign_out().await;
        pending.settle(|state| state.session = None);
        result.map_err(|e| self.fail(Operation::SignOut, e))
    }

    /// Forgets the session locally. The gate stays settled (signed out).
    pub fn reset(&self) {
        {
            let mut state = self.write();
            state.session = None;
            state.in_flight = 0;
            state.settled = true;
            state.epoch += 1;
            state.version += 1;
        }
        let _ = self.events.send(StoreEvent::Reset { family: FAMILY });
    }

    fn read(&self) -> RwLockReadGuard<'_, AuthState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AuthState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self) -> Pending<'_> {
        let (epoch, version) = {
            let mut state = self.write();
            state.in_flight += 1;
            state.version += 1;
            (state.epoch, state.version)
        };
        self.notify(version);
        Pending {
            store: self,
            epoch,
            settled: false,
        }
    }

    fn apply(&self, epoch: u64, determined: bool, change: impl FnOnce(&mut AuthState)) {
        let version = {
            let mut state = self.write();
            if state.epoch != epoch {
                return;
            }
            change(&mut state);
            state.in_flight = state.in_flight.saturating_sub(1);
            state.settled |= determined;
            state.version += 1;
            state.version
        };
        self.notify(version);
    }

    fn notify(&self, version: u64) {
        let _ = self.events.send(StoreEvent::Changed {
            family: FAMILY,
            version,
        });
    }

    fn fail(&self, operation: Operation, source: GatewayError) -> StoreError {
        warn!(%operation, error = %source, "auth operation failed");
        let _ = self.events.send(StoreEvent::Failed {
            family: FAMILY,
            operation,
            message: source.to_string(),
        });
        StoreError::Remote {
            family: FAMILY,
            operation,
            source,
        }
    }
}

impl IdentityGate for AuthStore {
    fn gate_state(&self) -> GateState {
        let state = self.read();
        GateState {
            is_authenticated: state
                .session
                .as_ref()
                .is_some_and(|s| !s.is_expired(Utc::now())),
            loading: state.in_flight > 0 || !state.settled,
        }
    }
}

impl Resettable for AuthStore {
    fn family(&self) -> &'static str {
        FAMILY
    }

    fn reset(&self) {
        AuthStore::reset(self);
    }
}
