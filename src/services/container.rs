//! Service Container - Centralized service access.
//!
//! Wires the concrete services over one shared Unit of Work and hands
//! them out as trait objects.

use std::future::Future;
use std::sync::Arc;

use super::{
    AuthService, Authenticator, Directory, DirectoryService, FeedbackDesk, FeedbackService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::Persistence;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn directory(&self) -> Arc<dyn DirectoryService>;

    fn feedback(&self) -> Arc<dyn FeedbackService>;
}

/// Concrete implementation of ServiceContainer
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    directory_service: Arc<dyn DirectoryService>,
    feedback_service: Arc<dyn FeedbackService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        directory_service: Arc<dyn DirectoryService>,
        feedback_service: Arc<dyn FeedbackService>,
    ) -> Self {
        Self {
            auth_service,
            directory_service,
            feedback_service,
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: &Config) -> Self {
        let uow = Arc::new(Persistence::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(uow.clone(), config)),
            directory_service: Arc::new(Directory::new(uow.clone())),
            feedback_service: Arc::new(FeedbackDesk::new(uow)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn directory(&self) -> Arc<dyn DirectoryService> {
        self.directory_service.clone()
    }

    fn feedback(&self) -> Arc<dyn FeedbackService> {
        self.feedback_service.clone()
    }
}

/// Concurrent execution of independent service reads.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Run two independent operations concurrently; the first error wins.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }
}
