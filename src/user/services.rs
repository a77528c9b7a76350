//! Application service for user upsert and lookup.

use crate::user::{
    domain::{ExternalUserId, User, UserDomainError, UserProfile},
    ports::{UserRepository, UserRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for recording a login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertUserRequest {
    external_id: String,
    username: String,
    email: Option<String>,
    avatar_url: Option<String>,
}

impl UpsertUserRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(external_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            username: username.into(),
            email: None,
            avatar_url: None,
        }
    }

    /// Sets the e-mail address.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email;
        self
    }

    /// Sets the avatar URL.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url;
        self
    }
}

/// Service-level errors for user operations.
#[derive(Debug, Error)]
pub enum UserServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] UserDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] UserRepositoryError),
}

/// Result type for user service operations.
pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// User orchestration service.
pub struct UserService<R, C>
where
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for UserService<R, C>
where
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> UserService<R, C>
where
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new user service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Inserts the user or refreshes the stored profile.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Domain`] for invalid input and
    /// [`UserServiceError::Repository`] when persistence fails.
    pub async fn upsert(&self, request: UpsertUserRequest) -> UserServiceResult<User> {
        let external_id = ExternalUserId::new(request.external_id)?;
        let profile = UserProfile::new(external_id, request.username)?
            .with_email(request.email)
            .with_avatar_url(request.avatar_url);
        Ok(self.repository.upsert(&profile, self.clock.utc()).await?)
    }

    /// Finds a user by external id.
    ///
    /// # Errors
    ///
    /// Returns [`UserServiceError::Domain`] for a malformed id and
    /// [`UserServiceError::Repository`] when persistence fails.
    pub async fn find(&self, external_id: &str) -> UserServiceResult<Option<User>> {
        let external_id = ExternalUserId::new(external_id)?;
        Ok(self.repository.find_by_external_id(&external_id).await?)
    }
}
