//! Shared setup for integration tests: a migrated in-memory SQLite database
//! behind the real services.

#![allow(dead_code)]

use std::sync::Arc;

use uuid::Uuid;

use feedback_tracker::api::AppState;
use feedback_tracker::config::Config;
use feedback_tracker::domain::{Sentiment, User, UserRole};
use feedback_tracker::infra::Database;
use feedback_tracker::services::{
    AuthService, DirectoryService, FeedbackDraft, FeedbackService, Registration,
    ServiceContainer, Services,
};

pub const TEST_SECRET: &str = "integration-test-secret-with-32-plus-bytes";
pub const TEST_PASSWORD: &str = "correct-horse-battery";

pub struct TestContext {
    pub database: Arc<Database>,
    pub config: Config,
    pub services: Services,
}

/// One pooled connection, so every query sees the same in-memory database
pub async fn setup() -> TestContext {
    let database = Database::connect_url("sqlite::memory:", 1)
        .await
        .expect("in-memory database");
    let config = Config::new("sqlite::memory:", TEST_SECRET).expect("test config");
    let services = Services::from_connection(database.get_connection(), &config);

    TestContext {
        database: Arc::new(database),
        config,
        services,
    }
}

impl TestContext {
    pub fn auth(&self) -> Arc<dyn AuthService> {
        self.services.auth()
    }

    pub fn directory(&self) -> Arc<dyn DirectoryService> {
        self.services.directory()
    }

    pub fn feedback(&self) -> Arc<dyn FeedbackService> {
        self.services.feedback()
    }

    pub fn state(&self) -> AppState {
        AppState::new(&self.services, self.database.clone(), self.config.clone())
    }

    pub async fn register(&self, username: &str, role: UserRole, manager_id: Option<Uuid>) -> User {
        self.directory()
            .register(registration(username, role, manager_id))
            .await
            .expect("registration")
    }

    pub async fn manager(&self, username: &str) -> User {
        self.register(username, UserRole::Manager, None).await
    }

    pub async fn developer(&self, username: &str, manager_id: Option<Uuid>) -> User {
        self.register(username, UserRole::Developer, manager_id).await
    }
}

pub fn registration(username: &str, role: UserRole, manager_id: Option<Uuid>) -> Registration {
    Registration {
        username: username.to_string(),
        full_name: format!("{} Example", username),
        password: TEST_PASSWORD.to_string(),
        role,
        manager_id,
    }
}

pub fn draft(receiver_id: Uuid, rating: i32) -> FeedbackDraft {
    FeedbackDraft {
        receiver_id,
        strengths: "Keeps the team unblocked".to_string(),
        areas_to_improve: "Write things down".to_string(),
        overall_sentiment: Sentiment::Positive,
        rating,
    }
}
