//! User aggregate and profile values.

use super::UserDomainError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_EXTERNAL_ID_LEN: usize = 64;

/// Internal storage identifier for a user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRecordId(Uuid);

impl UserRecordId {
    /// Creates a new random identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates an identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserRecordId {
    fn default() -> Self {
        Self::new()
    }
}

/// Account id issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExternalUserId(String);

impl ExternalUserId {
    /// Creates a validated external id.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::InvalidExternalId`] when the value is
    /// blank, contains whitespace, or is longer than 64 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, UserDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty()
            || trimmed.chars().count() > MAX_EXTERNAL_ID_LEN
            || trimmed.chars().any(char::is_whitespace)
        {
            return Err(UserDomainError::InvalidExternalId(raw));
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the id as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExternalUserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Profile data reported by the identity provider on login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    external_id: ExternalUserId,
    username: String,
    email: Option<String>,
    avatar_url: Option<String>,
}

impl UserProfile {
    /// Creates a profile with the required fields.
    ///
    /// # Errors
    ///
    /// Returns [`UserDomainError::EmptyUsername`] when the username is blank.
    pub fn new(
        external_id: ExternalUserId,
        username: impl Into<String>,
    ) -> Result<Self, UserDomainError> {
        let normalized = username.into().trim().to_owned();
        if normalized.is_empty() {
            return Err(UserDomainError::EmptyUsername);
        }
        Ok(Self {
            external_id,
            username: normalized,
            email: None,
            avatar_url: None,
        })
    }

    /// Sets the e-mail address; blank values are treated as absent.
    #[must_use]
    pub fn with_email(mut self, email: Option<String>) -> Self {
        self.email = email.filter(|value| !value.trim().is_empty());
        self
    }

    /// Sets the avatar URL; blank values are treated as absent.
    #[must_use]
    pub fn with_avatar_url(mut self, avatar_url: Option<String>) -> Self {
        self.avatar_url = avatar_url.filter(|value| !value.trim().is_empty());
        self
    }

    /// Returns the external id.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalUserId {
        &self.external_id
    }

    /// Returns the username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the e-mail address.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the avatar URL.
    #[must_use]
    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}

/// Stored user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserRecordId,
    profile: UserProfile,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedUserData {
    /// Persisted identifier.
    pub id: UserRecordId,
    /// Persisted profile.
    pub profile: UserProfile,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a first-time user record stamped at `now`.
    #[must_use]
    pub fn register(profile: UserProfile, now: DateTime<Utc>) -> Self {
        Self {
            id: UserRecordId::new(),
            profile,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a user from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedUserData) -> Self {
        Self {
            id: data.id,
            profile: data.profile,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Replaces the profile with the latest login data.
    pub fn refresh(&mut self, profile: UserProfile, now: DateTime<Utc>) {
        self.profile = profile;
        self.updated_at = now;
    }

    /// Returns the internal identifier.
    #[must_use]
    pub const fn id(&self) -> UserRecordId {
        self.id
    }

    /// Returns the profile.
    #[must_use]
    pub const fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Returns the external id.
    #[must_use]
    pub const fn external_id(&self) -> &ExternalUserId {
        self.profile.external_id()
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
