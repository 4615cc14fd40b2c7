//! Application state - Dependency injection container.
//!
//! Provides centralized access to all application services and infrastructure.

use std::sync::Arc;

use crate::config::Config;
use crate::infra::Database;
use crate::services::{
    AuthService, DirectoryService, FeedbackService, ServiceContainer, Services,
};

/// Application state containing all services (DI container).
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub directory_service: Arc<dyn DirectoryService>,
    pub feedback_service: Arc<dyn FeedbackService>,
    /// Database handle, used by the health check
    pub database: Arc<Database>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Create application state from database connection and config.
    pub fn from_config(database: Arc<Database>, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), &config);
        Self::new(&container, database, config)
    }

    /// Create application state from any service container.
    pub fn new(services: &dyn ServiceContainer, database: Arc<Database>, config: Config) -> Self {
        Self {
            auth_service: services.auth(),
            directory_service: services.directory(),
            feedback_service: services.feedback(),
            database,
            config: Arc::new(config),
        }
    }
}
