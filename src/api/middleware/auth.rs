//! Session authentication middleware.

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::api::AppState;
use crate::config::{BEARER_TOKEN_PREFIX, SESSION_COOKIE_NAME};
use crate::domain::User;
use crate::errors::AppError;

/// Authenticated user, freshly resolved from storage for this request
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// Session authentication middleware.
///
/// Takes the token from `Authorization: Bearer` or, failing that, from the
/// session cookie, resolves its owner and injects `CurrentUser` into the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let user = state.auth_service.verify_session(&token).await?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}

/// Session token carried by the request, header first.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE_NAME)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    #[test]
    fn test_bearer_header_token() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def"));
    }

    #[test]
    fn test_cookie_token() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; access_token=xyz"));
        assert_eq!(session_token(&headers).as_deref(), Some("xyz"));
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("access_token=from-cookie"));
        assert_eq!(session_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn test_missing_or_malformed_credentials() {
        assert!(session_token(&HeaderMap::new()).is_none());

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert!(session_token(&headers).is_none());
    }
}
