//! API layer - HTTP handlers and middleware
//!
//! Request handlers, session middleware, custom extractors and route
//! definitions. Handlers translate HTTP to service calls and nothing more.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use routes::create_router;
pub use state::AppState;
