//! Authentication service - credentials and sessions.
//!
//! A session is a signed, expiring HS256 token naming the username. Every
//! verification re-resolves the user so role and team changes are seen
//! immediately and tokens for vanished users stop working.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Username of the session owner
    pub sub: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Check credentials. Unknown username and wrong password fail identically.
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User>;

    /// Sign a session token for an authenticated user
    fn issue_session(&self, user: &User) -> AppResult<TokenResponse>;

    /// Validate a session token and resolve its owner
    async fn verify_session(&self, token: &str) -> AppResult<User>;

    /// `authenticate` followed by `issue_session`
    async fn login(&self, username: &str, password: &str) -> AppResult<TokenResponse>;
}

/// Signing material and lifetime, derived once from config.
struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_hours: i64,
}

impl SessionKeys {
    fn from_config(config: &Config) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.jwt_secret_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl_hours: config.session_ttl_hours,
        }
    }
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    keys: SessionKeys,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: &Config) -> Self {
        Self {
            uow,
            keys: SessionKeys::from_config(config),
        }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn authenticate(&self, username: &str, password: &str) -> AppResult<User> {
        let user = self.uow.users().find_by_username(username).await?;

        // Always run a full hash verification so a miss costs the same as a wrong password
        let stored_hash = user.as_ref().map(|u| u.password_hash.as_str());
        if !Password::verify_stored(stored_hash, password) {
            tracing::debug!("Rejected login attempt");
            return Err(AppError::InvalidCredentials);
        }

        user.ok_or(AppError::InvalidCredentials)
    }

    fn issue_session(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.keys.ttl_hours);

        let claims = Claims {
            sub: user.username.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.keys.ttl_hours * SECONDS_PER_HOUR,
        })
    }

    async fn verify_session(&self, token: &str) -> AppResult<User> {
        let data = decode::<Claims>(token, &self.keys.decoding, &self.keys.validation)
            .map_err(|e| {
                tracing::debug!("Session rejected: {}", e);
                AppError::SessionInvalid
            })?;

        self.uow
            .users()
            .find_by_username(&data.claims.sub)
            .await?
            .ok_or(AppError::SessionInvalid)
    }

    async fn login(&self, username: &str, password: &str) -> AppResult<TokenResponse> {
        let user = self.authenticate(username, password).await?;
        let token = self.issue_session(&user)?;
        tracing::info!(user_id = %user.id, "User logged in");
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserRole;
    use crate::infra::{MockFeedbackRepository, MockUserRepository};
    use crate::services::test_support::{developer, test_config, TestUnitOfWork};

    fn with_password(mut user: User, plain: &str) -> User {
        user.password_hash = Password::new(plain).unwrap().into_string();
        user
    }

    fn authenticator(users: MockUserRepository) -> Authenticator<TestUnitOfWork> {
        let uow = TestUnitOfWork::new(users, MockFeedbackRepository::new());
        Authenticator::new(Arc::new(uow), &test_config())
    }

    fn lookup_returning(user: Option<User>) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(move |_| Ok(user.clone()));
        users
    }

    #[tokio::test]
    async fn test_login_issues_bearer_token() {
        let user = with_password(developer("dana", None), "correct-horse");
        let auth = authenticator(lookup_returning(Some(user)));

        let token = auth.login("dana", "correct-horse").await.unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert!(!token.access_token.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_user_and_wrong_password_are_indistinguishable() {
        let user = with_password(developer("dana", None), "correct-horse");

        let wrong_password = authenticator(lookup_returning(Some(user)))
            .authenticate("dana", "battery-staple")
            .await
            .unwrap_err();
        let unknown_user = authenticator(lookup_returning(None))
            .authenticate("nobody", "battery-staple")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.code(), unknown_user.code());
        assert_eq!(wrong_password.user_message(), unknown_user.user_message());
        assert!(matches!(unknown_user, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_verify_session_resolves_live_user() {
        let user = developer("dana", None);
        let auth = authenticator(lookup_returning(Some(user.clone())));

        let token = auth.issue_session(&user).unwrap();
        let resolved = auth.verify_session(&token.access_token).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.role, UserRole::Developer);
    }

    #[tokio::test]
    async fn test_session_for_removed_user_is_invalid() {
        let user = developer("ghost", None);
        let auth = authenticator(lookup_returning(None));

        let token = auth.issue_session(&user).unwrap();
        assert!(matches!(
            auth.verify_session(&token.access_token).await,
            Err(AppError::SessionInvalid)
        ));
    }

    #[tokio::test]
    async fn test_tampered_and_foreign_tokens_are_rejected() {
        let user = developer("dana", None);
        let auth = authenticator(MockUserRepository::new());

        let token = auth.issue_session(&user).unwrap().access_token;
        let tampered = format!("{}x", token);
        assert!(matches!(
            auth.verify_session(&tampered).await,
            Err(AppError::SessionInvalid)
        ));

        let claims = Claims {
            sub: user.username.clone(),
            role: user.role.to_string(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            iat: Utc::now().timestamp(),
        };
        let foreign = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"another-secret-that-is-long-enough!!"),
        )
        .unwrap();
        assert!(matches!(
            auth.verify_session(&foreign).await,
            Err(AppError::SessionInvalid)
        ));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let user = developer("dana", None);
        let auth = authenticator(MockUserRepository::new());
        let config = test_config();

        let issued = Utc::now() - Duration::hours(3);
        let claims = Claims {
            sub: user.username.clone(),
            role: user.role.to_string(),
            exp: (issued + Duration::hours(1)).timestamp(),
            iat: issued.timestamp(),
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret_bytes()),
        )
        .unwrap();

        assert!(matches!(
            auth.verify_session(&expired).await,
            Err(AppError::SessionInvalid)
        ));
    }
}
