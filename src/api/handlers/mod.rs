//! HTTP request handlers.

pub mod auth_handler;
pub mod feedback_handler;
pub mod user_handler;

pub use auth_handler::{auth_routes, session_routes};
pub use feedback_handler::feedback_routes;
pub use user_handler::{public_user_routes, user_routes};
