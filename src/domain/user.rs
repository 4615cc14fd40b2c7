//! User domain entity and related types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::rating::display_rating;
use crate::config::{ROLE_DEVELOPER, ROLE_MANAGER};
use crate::errors::AppError;

/// User roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Manager,
    Developer,
}

impl UserRole {
    /// Check if this role may supervise a team
    pub fn is_manager(&self) -> bool {
        matches!(self, UserRole::Manager)
    }

    pub fn is_developer(&self) -> bool {
        matches!(self, UserRole::Developer)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Manager => ROLE_MANAGER,
            UserRole::Developer => ROLE_DEVELOPER,
        }
    }
}

impl FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_MANAGER => Ok(UserRole::Manager),
            ROLE_DEVELOPER => Ok(UserRole::Developer),
            _ => Err(AppError::validation(format!(
                "Invalid role '{}'. Must be '{}' or '{}'",
                s, ROLE_MANAGER, ROLE_DEVELOPER
            ))),
        }
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
///
/// `manager_id` is a plain reference; the manager record is looked up on demand
/// and team membership is always a query, never a stored back-pointer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_manager(&self) -> bool {
        self.role.is_manager()
    }

    pub fn is_developer(&self) -> bool {
        self.role.is_developer()
    }

    /// Check if `member` is one of this user's direct reports
    pub fn manages(&self, member: &User) -> bool {
        self.is_manager() && member.manager_id == Some(self.id)
    }
}

/// Data required to persist a new user (password already hashed)
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub full_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub manager_id: Option<Uuid>,
}

/// Compact user view used for managers and team listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    /// User role
    pub role: UserRole,
    /// Average received rating, 5.0 when nothing has been received yet
    #[schema(example = 4.5)]
    pub rating: f64,
}

impl UserSummary {
    pub fn new(user: &User, average: Option<f64>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            rating: display_rating(average),
        }
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    /// Unique user identifier
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    /// Login name
    #[schema(example = "jdoe")]
    pub username: String,
    /// Display name
    #[schema(example = "John Doe")]
    pub full_name: String,
    /// User role
    pub role: UserRole,
    /// Identifier of the supervising manager, if any
    pub manager_id: Option<Uuid>,
    /// Average received rating, 5.0 when nothing has been received yet
    #[schema(example = 4.0)]
    pub rating: f64,
    /// Resolved manager, when one is assigned and still exists
    pub manager: Option<UserSummary>,
    /// Account creation timestamp
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: &User, average: Option<f64>, manager: Option<UserSummary>) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            full_name: user.full_name.clone(),
            role: user.role,
            manager_id: user.manager_id,
            rating: display_rating(average),
            manager,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole, manager_id: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "someone".to_string(),
            password_hash: "hashed".to_string(),
            full_name: "Some One".to_string(),
            role,
            manager_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_round_trip_through_str() {
        assert_eq!("manager".parse::<UserRole>().unwrap(), UserRole::Manager);
        assert_eq!("developer".parse::<UserRole>().unwrap(), UserRole::Developer);
        assert_eq!(UserRole::Manager.to_string(), "manager");
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        assert!(matches!(
            "admin".parse::<UserRole>(),
            Err(AppError::Validation(_))
        ));
        assert!("Manager".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_manages_only_direct_reports() {
        let boss = user(UserRole::Manager, None);
        let report = user(UserRole::Developer, Some(boss.id));
        let other = user(UserRole::Developer, None);

        assert!(boss.manages(&report));
        assert!(!boss.manages(&other));
        assert!(!report.manages(&boss));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_string(&user(UserRole::Developer, None)).unwrap();
        assert!(!json.contains("password_hash"));
    }

    #[test]
    fn test_response_applies_display_rating() {
        let u = user(UserRole::Developer, None);
        assert_eq!(UserResponse::new(&u, None, None).rating, 5.0);
        assert_eq!(UserResponse::new(&u, Some(3.5), None).rating, 3.5);
    }
}
