//! Domain layer - Core business entities and logic
//!
//! Users, feedback records, the rating aggregate and the access-control
//! policy. Nothing here knows about HTTP or the database.

pub mod feedback;
pub mod password;
pub mod policy;
pub mod rating;
pub mod user;

pub use feedback::{
    Acknowledgement, Feedback, FeedbackChanges, FeedbackResponse, FeedbackView, GiverInfo,
    NewFeedback, Sentiment,
};
pub use password::Password;
pub use rating::{average_rating, display_rating, Rating};
pub use user::{NewUser, User, UserResponse, UserRole, UserSummary};
