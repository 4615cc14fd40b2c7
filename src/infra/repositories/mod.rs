//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

pub(crate) mod entities;
mod feedback_repository;
pub(crate) mod user_repository;

pub use feedback_repository::{FeedbackRepository, FeedbackStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use feedback_repository::MockFeedbackRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
