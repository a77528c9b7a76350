//! Repository port for task persistence and guild-scoped numbering.

use crate::task::domain::{GuildId, NewTask, Task, TaskChanges, TaskId, TaskNumber, UserId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for task repository operations.
pub type TaskRepositoryResult<T> = Result<T, TaskRepositoryError>;

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Allocates the next task number for the task's guild and stores it.
    ///
    /// Allocation and insert happen atomically: concurrent calls for the same
    /// guild never receive the same number, and a failed insert consumes no
    /// number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::DuplicateNumber`] if the unique
    /// `(guild, number)` constraint fires anyway, or
    /// [`TaskRepositoryError::Persistence`] on storage failure.
    async fn create(&self, task: &NewTask) -> TaskRepositoryResult<Task>;

    /// Finds a task by guild and task number.
    ///
    /// Returns `None` when the task does not exist.
    async fn find(&self, guild_id: &GuildId, number: TaskNumber)
    -> TaskRepositoryResult<Option<Task>>;

    /// Lists the guild's tasks where `user` is author or executor, ordered by
    /// ascending task number and optionally restricted to one number.
    async fn list_for_member(
        &self,
        guild_id: &GuildId,
        user: &UserId,
        number: Option<TaskNumber>,
    ) -> TaskRepositoryResult<Vec<Task>>;

    /// Applies `changes` to the task when `caller` is its author or
    /// executor, stamps it with `updated_at` and returns the stored task.
    ///
    /// The ownership check and the write happen in one atomic step, so
    /// concurrent partial updates to different fields all survive and a
    /// caller who loses access mid-flight cannot write.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task matches the
    /// guild and number with `caller` as author or executor.
    async fn update_for_member(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
        caller: &UserId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task>;

    /// Hard-deletes the task with the given number authored by `author`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::NotFound`] when no task matches the
    /// guild, number and author together.
    async fn delete_authored(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
        author: &UserId,
    ) -> TaskRepositoryResult<()>;
}

/// Errors returned by task repository implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskRepositoryError {
    /// A task with the same internal identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// The guild task number is already taken.
    #[error("task number {number} already exists in guild {guild_id}")]
    DuplicateNumber {
        /// Guild in which the collision happened.
        guild_id: GuildId,
        /// Colliding task number.
        number: TaskNumber,
    },

    /// The task was not found.
    #[error("task {number} not found in guild {guild_id}")]
    NotFound {
        /// Guild that was searched.
        guild_id: GuildId,
        /// Task number that was searched.
        number: TaskNumber,
    },

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Creates a not-found error for the given guild and number.
    #[must_use]
    pub fn not_found(guild_id: &GuildId, number: TaskNumber) -> Self {
        Self::NotFound {
            guild_id: guild_id.clone(),
            number,
        }
    }
}
