//! Fixtures shared by the service unit tests.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::domain::{Feedback, Sentiment, User, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{
    FeedbackRepository, MockFeedbackRepository, MockUserRepository, TransactionContext,
    UnitOfWork, UserRepository,
};

/// Unit of Work over mocked repositories; transactional paths are covered by
/// the SQLite integration tests instead.
pub(crate) struct TestUnitOfWork {
    users: Arc<MockUserRepository>,
    feedback: Arc<MockFeedbackRepository>,
}

impl TestUnitOfWork {
    pub(crate) fn new(users: MockUserRepository, feedback: MockFeedbackRepository) -> Self {
        Self {
            users: Arc::new(users),
            feedback: Arc::new(feedback),
        }
    }
}

#[async_trait]
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn feedback(&self) -> Arc<dyn FeedbackRepository> {
        self.feedback.clone()
    }

    async fn transaction<F, T>(&self, _f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        Err(AppError::internal("no transactions over mocked repositories"))
    }
}

pub(crate) fn test_config() -> Config {
    Config::new("sqlite::memory:", "unit-test-secret-unit-test-secret!").unwrap()
}

fn user(username: &str, role: UserRole, manager_id: Option<Uuid>) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        username: username.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        full_name: format!("{} Example", username),
        role,
        manager_id,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) fn manager(username: &str) -> User {
    user(username, UserRole::Manager, None)
}

pub(crate) fn developer(username: &str, manager_id: Option<Uuid>) -> User {
    user(username, UserRole::Developer, manager_id)
}

pub(crate) fn feedback_record(giver: &User, receiver: &User, rating: i32) -> Feedback {
    let now = Utc::now();
    Feedback {
        id: Uuid::new_v4(),
        giver_id: giver.id,
        receiver_id: receiver.id,
        strengths: "Ships reliably".to_string(),
        areas_to_improve: "Documentation".to_string(),
        overall_sentiment: Sentiment::Positive,
        rating,
        is_acknowledged: false,
        acknowledged_at: None,
        created_at: now,
        updated_at: now,
    }
}
