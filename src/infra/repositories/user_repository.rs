//! User repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use crate::domain::{NewUser, User, UserRole};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Resolve a batch of ids; unknown ids are skipped
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>>;

    /// Point `id` at a new manager, replacing any previous one
    async fn set_manager(&self, id: Uuid, manager_id: Uuid) -> AppResult<User>;

    async fn list(&self) -> AppResult<Vec<User>>;

    /// Direct reports of `manager_id`
    async fn list_by_manager(&self, manager_id: Uuid) -> AppResult<Vec<User>>;

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        find_by_id(&self.db, id).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        find_by_username(&self.db, username).await
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = UserEntity::find()
            .filter(user::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        models.into_iter().map(User::try_from).collect()
    }

    async fn set_manager(&self, id: Uuid, manager_id: Uuid) -> AppResult<User> {
        let model = UserEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut active: ActiveModel = model.into();
        active.manager_id = Set(Some(manager_id));
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        User::try_from(model)
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;

        models.into_iter().map(User::try_from).collect()
    }

    async fn list_by_manager(&self, manager_id: Uuid) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::ManagerId.eq(manager_id))
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;

        models.into_iter().map(User::try_from).collect()
    }

    async fn list_by_role(&self, role: UserRole) -> AppResult<Vec<User>> {
        let models = UserEntity::find()
            .filter(user::Column::Role.eq(role.as_str()))
            .order_by_asc(user::Column::Username)
            .all(&self.db)
            .await?;

        models.into_iter().map(User::try_from).collect()
    }
}

// Queries shared with the transaction-scoped repository.

pub(crate) async fn find_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> AppResult<Option<User>> {
    UserEntity::find_by_id(id)
        .one(db)
        .await?
        .map(User::try_from)
        .transpose()
}

pub(crate) async fn find_by_username<C: ConnectionTrait>(
    db: &C,
    username: &str,
) -> AppResult<Option<User>> {
    UserEntity::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await?
        .map(User::try_from)
        .transpose()
}

pub(crate) async fn insert<C: ConnectionTrait>(db: &C, user: NewUser) -> AppResult<User> {
    let now = chrono::Utc::now();
    let active_model = ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(user.username),
        full_name: Set(user.full_name),
        password_hash: Set(user.password_hash),
        role: Set(user.role.to_string()),
        manager_id: Set(user.manager_id),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = active_model.insert(db).await.map_err(map_unique_violation)?;
    User::try_from(model)
}

fn map_unique_violation(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::conflict("Username"),
        _ => AppError::from(err),
    }
}
