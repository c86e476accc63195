//! Application state - Dependency injection container.
//!
//! Provides centralized access to the application services and
//! infrastructure shared across request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::{Database, UserStore};
use crate::services::{UserManager, UserService};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    /// User service
    pub user_service: Arc<dyn UserService>,
    /// Database connection
    pub database: Arc<Database>,
    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create application state from database connection and config.
    ///
    /// Wires the concrete repository into the service layer; tests
    /// construct services against mocks instead.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let repo = Arc::new(UserStore::new(database.get_connection()));
        let user_service = Arc::new(UserManager::new(repo));

        Self {
            user_service,
            database,
            config,
        }
    }
}
