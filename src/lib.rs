//! Feedback Tracker - team feedback between managers and developers
//!
//! Managers supervise teams of developers; anyone can give structured
//! feedback to another user, and the receiver acknowledges it once read.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Entities, ratings and the access-control policy
//! - **services**: Application use cases
//! - **infra**: Database, migrations, repositories, Unit of Work
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared response types
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Feedback, Password, User, UserRole};
pub use errors::{AppError, AppResult};
