//! Unit of Work pattern implementation.
//!
//! Centralizes repository access and owns the transaction lifecycle for
//! operations that must read and write atomically.

use async_trait::async_trait;
use sea_orm::{
    AccessMode, DatabaseConnection, DatabaseTransaction, IsolationLevel, TransactionTrait,
};
use std::sync::Arc;
use uuid::Uuid;

use super::repositories::{
    user_repository, FeedbackRepository, FeedbackStore, UserRepository, UserStore,
};
use crate::domain::{NewUser, User};
use crate::errors::{AppError, AppResult};

/// Unit of Work trait for dependency injection.
///
/// Not mockable directly because of the generic transaction method; tests
/// provide their own implementation around mocked repositories.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn feedback(&self) -> Arc<dyn FeedbackRepository>;

    /// Execute a closure within a transaction.
    ///
    /// Committed on success, rolled back on error.
    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send;
}

/// Repository access scoped to one open transaction.
pub struct TransactionContext<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TransactionContext<'a> {
    fn new(txn: &'a DatabaseTransaction) -> Self {
        Self { txn }
    }

    pub fn users(&self) -> TxUserRepository<'_> {
        TxUserRepository { txn: self.txn }
    }
}

/// Concrete implementation of UnitOfWork
pub struct Persistence {
    db: DatabaseConnection,
    user_repo: Arc<UserStore>,
    feedback_repo: Arc<FeedbackStore>,
}

impl Persistence {
    pub fn new(db: DatabaseConnection) -> Self {
        let user_repo = Arc::new(UserStore::new(db.clone()));
        let feedback_repo = Arc::new(FeedbackStore::new(db.clone()));
        Self {
            db,
            user_repo,
            feedback_repo,
        }
    }
}

#[async_trait]
impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn feedback(&self) -> Arc<dyn FeedbackRepository> {
        self.feedback_repo.clone()
    }

    async fn transaction<F, T>(&self, f: F) -> AppResult<T>
    where
        F: for<'a> FnOnce(TransactionContext<'a>) -> std::pin::Pin<
                Box<dyn std::future::Future<Output = AppResult<T>> + Send + 'a>,
            > + Send,
        T: Send,
    {
        let txn = self
            .db
            .begin_with_config(
                Some(IsolationLevel::ReadCommitted),
                Some(AccessMode::ReadWrite),
            )
            .await
            .map_err(AppError::from)?;

        let ctx = TransactionContext::new(&txn);

        match f(ctx).await {
            Ok(result) => {
                txn.commit().await.map_err(AppError::from)?;
                Ok(result)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }
}

/// Transaction-aware user repository.
///
/// Runs every query on the borrowed transaction, never on the pool.
pub struct TxUserRepository<'a> {
    txn: &'a DatabaseTransaction,
}

impl<'a> TxUserRepository<'a> {
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        user_repository::find_by_id(self.txn, id).await
    }

    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        user_repository::find_by_username(self.txn, username).await
    }

    pub async fn create(&self, user: NewUser) -> AppResult<User> {
        user_repository::insert(self.txn, user).await
    }
}
