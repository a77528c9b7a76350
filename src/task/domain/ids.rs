//! Identifier and validated scalar types for the task domain.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Longest external identifier accepted for guilds and users.
const MAX_EXTERNAL_ID_LEN: usize = 64;

/// Internal storage identifier for a task record.
///
/// Never shown to callers; the guild-scoped [`TaskNumber`] is the
/// caller-facing identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random task identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a task identifier from an existing UUID.
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

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates an external identifier and returns its normalized form.
fn normalize_external_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let is_valid = !trimmed.is_empty()
        && trimmed.chars().count() <= MAX_EXTERNAL_ID_LEN
        && !trimmed.chars().any(char::is_whitespace);
    is_valid.then(|| trimmed.to_owned())
}

/// Identifier of the guild (team or server) that scopes task numbering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuildId(String);

impl GuildId {
    /// Creates a validated guild identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidGuildId`] when the value is empty,
    /// contains whitespace, or is longer than 64 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        normalize_external_id(&raw)
            .map(Self)
            .ok_or(TaskDomainError::InvalidGuildId(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for GuildId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for GuildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External (OAuth / chat platform) user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a validated user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidUserId`] when the value is empty,
    /// contains whitespace, or is longer than 64 characters.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        normalize_external_id(&raw)
            .map(Self)
            .ok_or(TaskDomainError::InvalidUserId(raw))
    }

    /// Returns the identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Guild-scoped, 1-based task number shown to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskNumber(u64);

impl TaskNumber {
    /// Largest task number representable in the current `PostgreSQL` schema.
    const MAX_PERSISTED_VALUE: u64 = i64::MAX as u64;

    /// The first number assigned in every guild.
    pub const FIRST: Self = Self(1);

    /// Creates a validated task number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskNumber`] when the value is zero
    /// or exceeds the schema-backed maximum (`i64::MAX`).
    pub fn new(value: u64) -> Result<Self, TaskDomainError> {
        if value == 0 || value > Self::MAX_PERSISTED_VALUE {
            return Err(TaskDomainError::InvalidTaskNumber(value.to_string()));
        }
        Ok(Self(value))
    }

    /// Parses a task number from caller input such as `"3"` or `"#3"`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskNumber`] when the input is not
    /// a positive integer.
    pub fn parse(raw: &str) -> Result<Self, TaskDomainError> {
        let trimmed = raw.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let value = digits
            .parse::<u64>()
            .map_err(|_| TaskDomainError::InvalidTaskNumber(raw.to_owned()))?;
        Self::new(value).map_err(|_| TaskDomainError::InvalidTaskNumber(raw.to_owned()))
    }

    /// Returns the underlying numeric value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the number following this one.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTaskNumber`] when the successor
    /// would exceed the persisted range.
    pub fn next(self) -> Result<Self, TaskDomainError> {
        let successor = self
            .0
            .checked_add(1)
            .ok_or_else(|| TaskDomainError::InvalidTaskNumber(format!("{}+1", self.0)))?;
        Self::new(successor)
    }
}

impl fmt::Display for TaskNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
