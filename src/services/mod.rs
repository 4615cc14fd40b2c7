//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and infrastructure to fulfil
//! application use cases. They depend on abstractions (traits) and reach
//! storage only through the Unit of Work.

mod auth_service;
pub mod container;
mod directory_service;
mod feedback_service;

#[cfg(test)]
pub(crate) mod test_support;

// Service Container
pub use container::{parallel, ServiceContainer, Services};

// Service traits and implementations
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use directory_service::{Directory, DirectoryService, Registration};
pub use feedback_service::{FeedbackDesk, FeedbackDraft, FeedbackPatch, FeedbackService};

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
