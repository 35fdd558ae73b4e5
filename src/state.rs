// src/state.rs

use std::sync::Arc;
use std::time::Duration;

use axum::extract::FromRef;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::services::allocator::SetAllocator;
use crate::services::catalog::QuestionCatalog;
use crate::services::notify::{LogNotifier, Notifier};
use crate::services::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    /// Durable identity/credential store.
    pub identity_pool: SqlitePool,

    /// Local session/results ledger. Distinct consistency domain from the
    /// identity store; no cross-store transactions exist.
    pub ledger_pool: SqlitePool,

    pub catalog: Arc<QuestionCatalog>,
    pub allocator: Arc<SetAllocator>,
    pub sessions: Arc<SessionStore>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Config,
}

impl AppState {
    pub fn new(identity_pool: SqlitePool, ledger_pool: SqlitePool, config: Config) -> Self {
        let catalog = Arc::new(QuestionCatalog::new(&config.data_dir));
        let allocator = Arc::new(SetAllocator::new(ledger_pool.clone(), catalog.clone()));
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(
            config.session_ttl_secs,
        )));

        Self {
            identity_pool,
            ledger_pool,
            catalog,
            allocator,
            sessions,
            notifier: Arc::new(LogNotifier),
            config,
        }
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
