//! API middleware.

mod auth;

pub use auth::{auth_middleware, session_token, CurrentUser};
