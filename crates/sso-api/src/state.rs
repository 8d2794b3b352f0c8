//! Application state shared across all handlers.

use std::sync::Arc;

use sso_auth::AuthManager;
use sso_core::config::AppConfig;
use sso_database::{CredentialStore, DatabasePool};

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Authentication engine
    pub auth: Arc<AuthManager>,
    /// PostgreSQL pool, absent when running on the in-memory store
    pub db_pool: Option<DatabasePool>,
}

impl AppState {
    /// Wires the auth engine over `store`.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CredentialStore>,
        db_pool: Option<DatabasePool>,
    ) -> Self {
        let auth = Arc::new(AuthManager::from_config(store, &config.auth));
        Self {
            config: Arc::new(config),
            auth,
            db_pool,
        }
    }
}
