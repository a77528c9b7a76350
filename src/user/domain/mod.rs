//! Domain model for signed-in users.

mod error;
mod user;

pub use error::UserDomainError;
pub use user::{ExternalUserId, PersistedUserData, User, UserProfile, UserRecordId};
