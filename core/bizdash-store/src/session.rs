//! One set of stores per signed-in session.
//!
//! Stores are plain values built once here and handed out by reference;
//! there is no process-global state. Tearing a session down means
//! resetting every store it owns.

use bizdash_gateway::{
    AuthGateway, HttpBackend, InMemoryAuthGateway, InMemoryGateway, RemoteGateway,
};
use bizdash_model::{Lead, MemoryFact, Tool, Transaction};
use std::sync::Arc;
use tracing::info;

use crate::auth::IdentityGate;
use crate::{AuthStore, Store, StoreConfig, StoreResult};

/// Something [`DashboardSession::reset_all`] can return to its initial state.
pub trait Resettable: Send + Sync {
    fn family(&self) -> &'static str;

    fn reset(&self);
}

/// The gateways a session's stores synchronize against.
#[derive(Clone)]
pub struct GatewaySet {
    pub auth: Arc<dyn AuthGateway>,
    pub leads: Arc<dyn RemoteGateway<Lead>>,
    pub transactions: Arc<dyn RemoteGateway<Transaction>>,
    pub tools: Arc<dyn RemoteGateway<Tool>>,
    pub memory: Arc<dyn RemoteGateway<MemoryFact>>,
}

impl GatewaySet {
    /// Empty in-memory backends with no accounts.
    pub fn in_memory() -> Self {
        Self::in_memory_with_auth(InMemoryAuthGateway::new())
    }

    pub fn in_memory_with_auth(auth: InMemoryAuthGateway) -> Self {
        Self {
            auth: Arc::new(auth),
            leads: Arc::new(InMemoryGateway::<Lead>::new()),
            transactions: Arc::new(InMemoryGateway::<Transaction>::new()),
            tools: Arc::new(InMemoryGateway::<Tool>::new()),
            memory: Arc::new(InMemoryGateway::<MemoryFact>::new()),
        }
    }

    /// REST gateways sharing `backend`'s client and session.
    pub fn http(backend: &HttpBackend) -> Self {
        Self {
            auth: Arc::new(backend.auth()),
            leads: Arc::new(backend.gateway::<Lead>()),
            transactions: Arc::new(backend.gateway::<Transaction>()),
            tools: Arc::new(backend.gateway::<Tool>()),
            memory: Arc::new(backend.gateway::<MemoryFact>()),
        }
    }
}

/// The auth store plus every data store of the dashboard.
///
/// Data stores refuse to talk to the backend until the auth gate has
/// settled on a signed-in user.
pub struct DashboardSession {
    auth: Arc<AuthStore>,
    leads: Arc<Store<Lead>>,
    transactions: Arc<Store<Transaction>>,
    tools: Arc<Store<Tool>>,
    memory: Arc<Store<MemoryFact>>,
}

impl DashboardSession {
    pub fn new(gateways: GatewaySet, config: StoreConfig) -> Self {
        let auth = Arc::new(AuthStore::new(gateways.auth, config.event_capacity));
        let gate: Arc<dyn IdentityGate> = auth.clone();

        Self {
            leads: Arc::new(
                Store::new(gateways.leads, config.clone()).requires_identity(gate.clone()),
            ),
            transactions: Arc::new(
                Store::new(gateways.transactions, config.clone()).requires_identity(gate.clone()),
            ),
            tools: Arc::new(
                Store::new(gateways.tools, config.clone()).requires_identity(gate.clone()),
            ),
            memory: Arc::new(Store::new(gateways.memory, config).requires_identity(gate)),
            auth,
        }
    }

    pub fn auth(&self) -> &Arc<AuthStore> {
        &self.auth
    }

    pub fn leads(&self) -> &Arc<Store<Lead>> {
        &self.leads
    }

    pub fn transactions(&self) -> &Arc<Store<Transaction>> {
        &self.transactions
    }

    pub fn tools(&self) -> &Arc<Store<Tool>> {
        &self.tools
    }

    pub fn memory(&self) -> &Arc<Store<MemoryFact>> {
        &self.memory
    }

    /// Fetches every data store concurrently.
    ///
    /// All fetches run even if some fail; the first failure is returned.
    pub async fn load_all(&self) -> StoreResult<()> {
        let (leads, transactions, tools, memory) = tokio::join!(
            self.leads.fetch_all(),
            self.transactions.fetch_all(),
            self.tools.fetch_all(),
            self.memory.fetch_all(),
        );
        [leads, transactions, tools, memory]
            .into_iter()
            .find_map(Result::err)
            .map_or(Ok(()), Err)
    }

    fn resettables(&self) -> [&dyn Resettable; 5] {
        [
            self.leads.as_ref(),
            self.transactions.as_ref(),
            self.tools.as_ref(),
            self.memory.as_ref(),
            self.auth.as_ref(),
        ]
    }

    /// Clears every store back to `Uninitialized` and forgets the session
    /// locally. Used by logout and by a full factory reset.
    pub fn reset_all(&self) {
        for store in self.resettables() {
            store.reset();
        }
        info!("all stores reset");
    }

    /// Signs out remotely, then resets everything whatever the outcome.
    pub async fn logout(&self) -> StoreResult<()> {
        let signed_out = self.auth.sign_out().await;
        self.reset_all();
        signed_out
    }
}
