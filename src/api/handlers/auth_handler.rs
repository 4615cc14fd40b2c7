//! Authentication handlers.

use axum::{
    extract::{Extension, State},
    response::Json,
    routing::{get, post},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::SESSION_COOKIE_NAME;
use crate::domain::{UserResponse, UserRole};
use crate::errors::AppResult;
use crate::services::{Registration, TokenResponse};
use crate::types::{Created, MessageResponse};

/// User registration request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    /// Unique login name
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "jdoe")]
    pub username: String,
    /// User password (minimum 8 characters)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "SecurePass123!", min_length = 8)]
    pub password: String,
    /// Display name
    #[validate(length(min = 1, message = "Full name is required"))]
    #[schema(example = "John Doe")]
    pub full_name: String,
    /// `manager` or `developer`
    #[validate(custom(function = "validate_role"))]
    #[schema(example = "developer")]
    pub role: String,
    /// Manager to report to (developers only)
    pub manager_id: Option<Uuid>,
}

fn validate_role(role: &str) -> Result<(), ValidationError> {
    role.parse::<UserRole>().map(|_| ()).map_err(|e| {
        let mut err = ValidationError::new("role");
        err.message = Some(e.to_string().into());
        err
    })
}

/// User login request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    #[schema(example = "jdoe")]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "SecurePass123!")]
    pub password: String,
}

/// Public authentication routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Authentication routes that need a session
pub fn session_routes() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered successfully", body = UserResponse),
        (status = 400, description = "Validation error or invalid manager"),
        (status = 409, description = "Username already exists")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> AppResult<Created<UserResponse>> {
    let role: UserRole = payload.role.parse()?;
    let user = state
        .directory_service
        .register(Registration {
            username: payload.username,
            full_name: payload.full_name,
            password: payload.password,
            role,
            manager_id: payload.manager_id,
        })
        .await?;

    let profile = state.directory_service.get_by_id(user.id).await?;
    Ok(Created(profile))
}

/// Log in; returns the token and also sets it as an HTTP-only cookie
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let token = state
        .auth_service
        .login(&payload.username, &payload.password)
        .await?;

    let cookie = session_cookie(token.access_token.clone(), state.config.secure_cookies);
    Ok((jar.add(cookie), Json(token)))
}

/// Clear the session cookie
///
/// Tokens are not revoked server-side; a copied token stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "Authentication",
    responses(
        (status = 200, description = "Session cookie cleared", body = MessageResponse)
    )
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE_NAME).path("/"));
    (jar, Json(MessageResponse::new("Logged out")))
}

/// Profile of the authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "Authentication",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user profile", body = UserResponse),
        (status = 401, description = "Missing or invalid session")
    )
)]
pub async fn me(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let profile = state.directory_service.get_by_id(user.id).await?;
    Ok(Json(profile))
}

/// Session cookie without its own lifetime; the token's `exp` governs validity
fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, token))
        .http_only(true)
        .secure(secure)
        .same_site(if secure { SameSite::None } else { SameSite::Lax })
        .path("/")
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_flags() {
        let dev = session_cookie("t".to_string(), false);
        assert_eq!(dev.name(), "access_token");
        assert_eq!(dev.http_only(), Some(true));
        assert_eq!(dev.same_site(), Some(SameSite::Lax));
        assert!(dev.max_age().is_none());

        let prod = session_cookie("t".to_string(), true);
        assert_eq!(prod.secure(), Some(true));
        assert_eq!(prod.same_site(), Some(SameSite::None));
    }

    #[test]
    fn test_register_request_rules() {
        let request = RegisterRequest {
            username: "jdoe".to_string(),
            password: "short".to_string(),
            full_name: "John Doe".to_string(),
            role: "admin".to_string(),
            manager_id: None,
        };
        let errors = request.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("password"));
        assert!(fields.contains_key("role"));
        assert!(!fields.contains_key("username"));
    }

    #[test]
    fn test_role_rule_matches_user_role_parsing() {
        assert!(validate_role("manager").is_ok());
        assert!(validate_role("developer").is_ok());

        for role in ["admin", "Manager", ""] {
            let err = validate_role(role).unwrap_err();
            let expected = role.parse::<UserRole>().unwrap_err().to_string();
            assert_eq!(err.message.unwrap(), expected);
        }
    }
}
