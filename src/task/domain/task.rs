//! Task aggregate root and related value types.

use super::{GuildId, ParsePriorityError, TaskDomainError, TaskId, TaskNumber, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    /// Urgent work.
    High,
    /// Regular work; the default for new tasks.
    #[default]
    Medium,
    /// Work that can wait.
    Low,
}

impl Priority {
    /// All priorities in display order.
    pub const ALL: [Self; 3] = [Self::High, Self::Medium, Self::Low];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

impl TryFrom<&str> for Priority {
    type Error = ParsePriorityError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParsePriorityError(value.to_owned())),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated task title.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTitle(String);

impl TaskTitle {
    /// Maximum title length in characters (Discord embed title limit).
    pub const MAX_LEN: usize = 256;

    /// Creates a validated, trimmed task title.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyTitle`] when the title is blank and
    /// [`TaskDomainError::TitleTooLong`] when it exceeds [`Self::MAX_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaskDomainError::EmptyTitle);
        }
        let actual = trimmed.chars().count();
        if actual > Self::MAX_LEN {
            return Err(TaskDomainError::TitleTooLong {
                max: Self::MAX_LEN,
                actual,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the title as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-text task description; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskDescription(String);

impl TaskDescription {
    /// Maximum description length in characters (Discord embed limit).
    pub const MAX_LEN: usize = 4096;

    /// Creates a validated description.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::DescriptionTooLong`] when the description
    /// exceeds [`Self::MAX_LEN`].
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let actual = raw.chars().count();
        if actual > Self::MAX_LEN {
            return Err(TaskDomainError::DescriptionTooLong {
                max: Self::MAX_LEN,
                actual,
            });
        }
        Ok(Self(raw))
    }

    /// Returns an empty description.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Returns the description as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the description has no text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A validated task that has not yet been assigned a guild task number.
///
/// Repositories turn a `NewTask` into a [`Task`] by allocating the next
/// number for its guild inside the insert transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    id: TaskId,
    guild_id: GuildId,
    title: TaskTitle,
    description: TaskDescription,
    priority: Priority,
    author_id: UserId,
    executor_id: UserId,
    created_at: DateTime<Utc>,
}

/// Parameter object for [`NewTask::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    /// Guild the task belongs to.
    pub guild_id: GuildId,
    /// Task title.
    pub title: TaskTitle,
    /// Task description.
    pub description: TaskDescription,
    /// Task priority.
    pub priority: Priority,
    /// Creating user.
    pub author_id: UserId,
    /// Assigned user; defaults to the author when `None`.
    pub executor_id: Option<UserId>,
}

impl NewTask {
    /// Creates a new unnumbered task stamped with the current clock time.
    #[must_use]
    pub fn new(draft: TaskDraft, clock: &impl Clock) -> Self {
        let TaskDraft {
            guild_id,
            title,
            description,
            priority,
            author_id,
            executor_id: assigned,
        } = draft;
        let executor_id = assigned.unwrap_or_else(|| author_id.clone());
        Self {
            id: TaskId::new(),
            guild_id,
            title,
            description,
            priority,
            author_id,
            executor_id,
            created_at: clock.utc(),
        }
    }

    /// Returns the internal identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning guild.
    #[must_use]
    pub const fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the author.
    #[must_use]
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor_id(&self) -> &UserId {
        &self.executor_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Assigns the allocated guild task number, producing the stored task.
    #[must_use]
    pub fn into_task(self, number: TaskNumber) -> Task {
        Task {
            id: self.id,
            guild_id: self.guild_id,
            number,
            title: self.title,
            description: self.description,
            priority: self.priority,
            author_id: self.author_id,
            executor_id: self.executor_id,
            created_at: self.created_at,
            updated_at: self.created_at,
        }
    }
}

/// Partial update of a task's mutable fields.
///
/// `None` leaves a field unchanged. Clearing the description is expressed
/// with `Some(TaskDescription::empty())`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    /// New title.
    pub title: Option<TaskTitle>,
    /// New description.
    pub description: Option<TaskDescription>,
    /// New priority.
    pub priority: Option<Priority>,
    /// New executor.
    pub executor_id: Option<UserId>,
}

impl TaskChanges {
    /// Returns `true` when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.executor_id.is_none()
    }
}

/// Task aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    guild_id: GuildId,
    number: TaskNumber,
    title: TaskTitle,
    description: TaskDescription,
    priority: Priority,
    author_id: UserId,
    executor_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted guild.
    pub guild_id: GuildId,
    /// Persisted guild task number.
    pub number: TaskNumber,
    /// Persisted title.
    pub title: TaskTitle,
    /// Persisted description.
    pub description: TaskDescription,
    /// Persisted priority.
    pub priority: Priority,
    /// Persisted author.
    pub author_id: UserId,
    /// Persisted executor.
    pub executor_id: UserId,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted latest update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            guild_id: data.guild_id,
            number: data.number,
            title: data.title,
            description: data.description,
            priority: data.priority,
            author_id: data.author_id,
            executor_id: data.executor_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the internal identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning guild.
    #[must_use]
    pub const fn guild_id(&self) -> &GuildId {
        &self.guild_id
    }

    /// Returns the guild-scoped task number.
    #[must_use]
    pub const fn number(&self) -> TaskNumber {
        self.number
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub const fn description(&self) -> &TaskDescription {
        &self.description
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> Priority {
        self.priority
    }

    /// Returns the author.
    #[must_use]
    pub const fn author_id(&self) -> &UserId {
        &self.author_id
    }

    /// Returns the executor.
    #[must_use]
    pub const fn executor_id(&self) -> &UserId {
        &self.executor_id
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

    /// Returns `true` when the user is the author or the executor.
    #[must_use]
    pub fn involves(&self, user: &UserId) -> bool {
        self.author_id == *user || self.executor_id == *user
    }

    /// Author and executor may update a task.
    #[must_use]
    pub fn can_be_updated_by(&self, user: &UserId) -> bool {
        self.involves(user)
    }

    /// Only the author may delete a task.
    #[must_use]
    pub fn can_be_deleted_by(&self, user: &UserId) -> bool {
        self.author_id == *user
    }

    /// Applies a partial update and refreshes `updated_at`.
    pub fn apply(&mut self, changes: TaskChanges, clock: &impl Clock) {
        self.apply_at(changes, clock.utc());
    }

    /// Applies a partial update stamped with `updated_at`.
    pub fn apply_at(&mut self, changes: TaskChanges, updated_at: DateTime<Utc>) {
        let TaskChanges {
            title,
            description,
            priority,
            executor_id,
        } = changes;
        if let Some(value) = title {
            self.title = value;
        }
        if let Some(value) = description {
            self.description = value;
        }
        if let Some(value) = priority {
            self.priority = value;
        }
        if let Some(value) = executor_id {
            self.executor_id = value;
        }
        self.updated_at = updated_at;
    }
}
