//! Directory service - users, registration and team relationships.
//!
//! Managers form the roots of a forest: developers point at their manager,
//! managers never have one. Every view carries the user's average rating.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use crate::domain::{
    average_rating, policy, NewUser, Password, User, UserResponse, UserRole, UserSummary,
};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// Registration input, already parsed but not yet validated
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
}

/// Directory service trait for dependency injection.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Create an account, optionally placed under an existing manager
    async fn register(&self, registration: Registration) -> AppResult<User>;

    /// Put a developer on the acting manager's team
    async fn assign_manager(&self, actor: &User, target_user_id: Uuid) -> AppResult<User>;

    /// Move a developer to another manager's team
    async fn reassign_manager(
        &self,
        actor: &User,
        target_user_id: Uuid,
        new_manager_id: Uuid,
    ) -> AppResult<User>;

    /// Direct reports of the acting manager
    async fn list_team(&self, actor: &User) -> AppResult<Vec<UserSummary>>;

    /// The actor's manager; `None` when unset or no longer resolvable
    async fn get_manager(&self, actor: &User) -> AppResult<Option<UserSummary>>;

    /// Every user with their manager resolved
    async fn list_all(&self, actor: &User) -> AppResult<Vec<UserResponse>>;

    async fn list_managers(&self) -> AppResult<Vec<UserSummary>>;

    /// Public profile with manager resolved
    async fn get_by_id(&self, user_id: Uuid) -> AppResult<UserResponse>;

    /// Mean rating over all feedback the user received
    async fn average_rating(&self, user_id: Uuid) -> AppResult<Option<f64>>;
}

/// Concrete implementation of DirectoryService using Unit of Work.
pub struct Directory<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> Directory<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    /// Averages for each of `ids` that has received at least one record
    async fn averages(&self, ids: Vec<Uuid>) -> AppResult<HashMap<Uuid, f64>> {
        let mut grouped: HashMap<Uuid, Vec<i32>> = HashMap::new();
        for (receiver_id, rating) in self.uow.feedback().ratings_for(ids).await? {
            grouped.entry(receiver_id).or_default().push(rating);
        }

        Ok(grouped
            .into_iter()
            .filter_map(|(id, ratings)| average_rating(&ratings).map(|avg| (id, avg)))
            .collect())
    }

    async fn summaries(&self, users: Vec<User>) -> AppResult<Vec<UserSummary>> {
        let averages = self.averages(users.iter().map(|u| u.id).collect()).await?;
        Ok(users
            .iter()
            .map(|u| UserSummary::new(u, averages.get(&u.id).copied()))
            .collect())
    }

    async fn resolve_manager(&self, manager_id: Option<Uuid>) -> AppResult<Option<User>> {
        match manager_id {
            Some(id) => self.uow.users().find_by_id(id).await,
            None => Ok(None),
        }
    }
}

fn required(value: String, field: &str) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{} must not be blank", field)));
    }
    Ok(trimmed.to_string())
}

#[async_trait]
impl<U: UnitOfWork> DirectoryService for Directory<U> {
    async fn register(&self, registration: Registration) -> AppResult<User> {
        let username = required(registration.username, "Username")?;
        let full_name = required(registration.full_name, "Full name")?;
        policy::ensure_registration_shape(registration.role, registration.manager_id)?;
        let password_hash = Password::new(&registration.password)?.into_string();

        let new_user = NewUser {
            username,
            full_name,
            password_hash,
            role: registration.role,
            manager_id: registration.manager_id,
        };

        let user = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let users = ctx.users();
                    if users.find_by_username(&new_user.username).await?.is_some() {
                        return Err(AppError::conflict("Username"));
                    }
                    if let Some(manager_id) = new_user.manager_id {
                        policy::ensure_manager_candidate(users.find_by_id(manager_id).await?)?;
                    }
                    users.create(new_user).await
                })
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        Ok(user)
    }

    async fn assign_manager(&self, actor: &User, target_user_id: Uuid) -> AppResult<User> {
        policy::require_manager(actor)?;
        let target = self
            .uow
            .users()
            .find_by_id(target_user_id)
            .await?
            .ok_or_not_found()?;
        policy::ensure_assignable(&target)?;

        let updated = self.uow.users().set_manager(target.id, actor.id).await?;
        tracing::info!(developer = %updated.id, manager = %actor.id, "Developer assigned");
        Ok(updated)
    }

    async fn reassign_manager(
        &self,
        actor: &User,
        target_user_id: Uuid,
        new_manager_id: Uuid,
    ) -> AppResult<User> {
        policy::require_manager(actor)?;
        let target = self
            .uow
            .users()
            .find_by_id(target_user_id)
            .await?
            .ok_or_not_found()?;
        policy::ensure_assignable(&target)?;
        let new_manager =
            policy::ensure_manager_candidate(self.uow.users().find_by_id(new_manager_id).await?)?;

        let updated = self.uow.users().set_manager(target.id, new_manager.id).await?;
        tracing::info!(
            developer = %updated.id,
            previous = ?target.manager_id,
            manager = %new_manager.id,
            actor = %actor.id,
            "Developer reassigned"
        );
        Ok(updated)
    }

    async fn list_team(&self, actor: &User) -> AppResult<Vec<UserSummary>> {
        policy::require_manager(actor)?;
        let team = self.uow.users().list_by_manager(actor.id).await?;
        self.summaries(team).await
    }

    async fn get_manager(&self, actor: &User) -> AppResult<Option<UserSummary>> {
        let Some(manager) = self.resolve_manager(actor.manager_id).await? else {
            return Ok(None);
        };
        let average = self.average_rating(manager.id).await?;
        Ok(Some(UserSummary::new(&manager, average)))
    }

    async fn list_all(&self, actor: &User) -> AppResult<Vec<UserResponse>> {
        policy::require_manager(actor)?;
        let users = self.uow.users().list().await?;
        let averages = self.averages(users.iter().map(|u| u.id).collect()).await?;
        let by_id: HashMap<Uuid, &User> = users.iter().map(|u| (u.id, u)).collect();

        Ok(users
            .iter()
            .map(|user| {
                let manager = user
                    .manager_id
                    .and_then(|id| by_id.get(&id))
                    .map(|m| UserSummary::new(m, averages.get(&m.id).copied()));
                UserResponse::new(user, averages.get(&user.id).copied(), manager)
            })
            .collect())
    }

    async fn list_managers(&self) -> AppResult<Vec<UserSummary>> {
        let managers = self.uow.users().list_by_role(UserRole::Manager).await?;
        self.summaries(managers).await
    }

    async fn get_by_id(&self, user_id: Uuid) -> AppResult<UserResponse> {
        let user = self.uow.users().find_by_id(user_id).await?.ok_or_not_found()?;

        let ids: Vec<Uuid> = std::iter::once(user.id).chain(user.manager_id).collect();
        let (manager, averages) =
            parallel::join2(self.resolve_manager(user.manager_id), self.averages(ids)).await?;

        let manager = manager.map(|m| UserSummary::new(&m, averages.get(&m.id).copied()));
        Ok(UserResponse::new(&user, averages.get(&user.id).copied(), manager))
    }

    async fn average_rating(&self, user_id: Uuid) -> AppResult<Option<f64>> {
        Ok(self.averages(vec![user_id]).await?.get(&user_id).copied())
    }
}
