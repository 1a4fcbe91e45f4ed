use std::sync::Arc;

use crate::{
    clock::{BusinessCalendar, Clock, SystemClock},
    config::{AppConfig, Policy, StoreBackend},
    db::run_migrations,
    locks::KeyedLocks,
    seed::{sample_accounts, seed_accounts},
    store::{
        AccountStore, AttemptStore, AuditLog, OrderStore, memory::MemoryStore, postgres::PgStore,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountStore>,
    pub orders: Arc<dyn OrderStore>,
    pub attempts: Arc<dyn AttemptStore>,
    pub audit: Arc<dyn AuditLog>,
    pub clock: Arc<dyn Clock>,
    pub calendar: BusinessCalendar,
    pub policy: Arc<Policy>,
    pub admin_api_key: Option<Arc<str>>,
    pub order_locks: Arc<KeyedLocks>,
    pub login_locks: Arc<KeyedLocks>,
}

impl AppState {
    /// Wires every store seam to one backend.
    pub fn new<S>(store: Arc<S>, clock: Arc<dyn Clock>, policy: Policy) -> Self
    where
        S: AccountStore + OrderStore + AttemptStore + AuditLog + 'static,
    {
        Self {
            accounts: store.clone(),
            orders: store.clone(),
            attempts: store.clone(),
            audit: store,
            clock,
            calendar: BusinessCalendar::new(policy.utc_offset_hours),
            policy: Arc::new(policy),
            admin_api_key: None,
            order_locks: Arc::new(KeyedLocks::new()),
            login_locks: Arc::new(KeyedLocks::new()),
        }
    }

    /// Connects the configured backend on the system clock. Postgres gets its
    /// migrations applied; the memory backend starts with the sample accounts.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let calendar = BusinessCalendar::new(config.policy.utc_offset_hours);

        let state = match config.backend {
            StoreBackend::Postgres => {
                let store = PgStore::connect(config.require_database_url()?, calendar).await?;
                run_migrations(store.orm()).await?;
                tracing::info!("postgres store ready");
                Self::new(Arc::new(store), clock, config.policy.clone())
            }
            StoreBackend::Memory => {
                let store = Arc::new(MemoryStore::new());
                let seeded = seed_accounts(store.as_ref(), sample_accounts()).await?;
                tracing::warn!(seeded, "using in-memory store; nothing survives a restart");
                Self::new(store, clock, config.policy.clone())
            }
        };

        Ok(state.with_admin_key(config.admin_api_key.clone()))
    }

    pub fn with_admin_key(mut self, key: Option<String>) -> Self {
        self.admin_api_key = key.map(Arc::from);
        self
    }
}
