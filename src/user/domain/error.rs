//! Error types for user domain validation.

use thiserror::Error;

/// Errors returned while constructing user values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserDomainError {
    /// The external account id is empty or malformed.
    #[error("invalid external user id '{0}'")]
    InvalidExternalId(String),

    /// The username is empty after trimming.
    #[error("username must not be empty")]
    EmptyUsername,
}
