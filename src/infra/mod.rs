//! Infrastructure layer - External systems integration
//!
//! Database connection, migrations, repositories and the Unit of Work that
//! ties them into transactions.

pub mod db;
pub mod repositories;
pub mod unit_of_work;

pub use db::{Database, Migrator};
pub use repositories::{FeedbackRepository, FeedbackStore, UserRepository, UserStore};
pub use unit_of_work::{Persistence, TransactionContext, TxUserRepository, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockFeedbackRepository, MockUserRepository};
