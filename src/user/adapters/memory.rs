//! In-memory user repository for tests and local runs.

use crate::user::{
    domain::{ExternalUserId, User, UserProfile},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Thread-safe in-memory user repository keyed by external id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<ExternalUserId, User>>>,
}

impl InMemoryUserRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> UserRepositoryError {
    UserRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn upsert(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> UserRepositoryResult<User> {
        let mut users = self.users.write().map_err(lock_error)?;
        let user = users
            .entry(profile.external_id().clone())
            .and_modify(|existing| existing.refresh(profile.clone(), now))
            .or_insert_with(|| User::register(profile.clone(), now));
        Ok(user.clone())
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> UserRepositoryResult<Option<User>> {
        let users = self.users.read().map_err(lock_error)?;
        Ok(users.get(external_id).cloned())
    }
}
