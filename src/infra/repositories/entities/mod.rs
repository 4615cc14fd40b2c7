//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

pub mod feedback;
pub mod user;

#[allow(unused_imports)]
pub use feedback::{
    ActiveModel as FeedbackActiveModel, Entity as FeedbackEntity, Model as FeedbackModel,
};
#[allow(unused_imports)]
pub use user::{ActiveModel as UserActiveModel, Entity as UserEntity, Model as UserModel};
