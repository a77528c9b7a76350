//! Service layer for guild-scoped task creation, update, listing and removal.

use crate::task::{
    domain::{
        GuildId, NewTask, Priority, Task, TaskChanges, TaskDescription, TaskDomainError, TaskDraft,
        TaskNumber, TaskTitle, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Returns `None` for absent or whitespace-only input.
fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.trim().is_empty())
}

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    guild_id: String,
    author_id: String,
    title: String,
    description: Option<String>,
    priority: Option<String>,
    executor_id: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        guild_id: impl Into<String>,
        author_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            author_id: author_id.into(),
            title: title.into(),
            description: None,
            priority: None,
            executor_id: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the priority; blank input falls back to `Medium`.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the executor; blank input falls back to the author.
    #[must_use]
    pub fn with_executor(mut self, executor_id: impl Into<String>) -> Self {
        self.executor_id = Some(executor_id.into());
        self
    }

    fn into_draft(self) -> Result<TaskDraft, TaskDomainError> {
        let description = self
            .description
            .map(TaskDescription::new)
            .transpose()?
            .unwrap_or_default();
        let priority = non_blank(self.priority)
            .map(|raw| Priority::try_from(raw.as_str()))
            .transpose()?
            .unwrap_or_default();
        let executor_id = non_blank(self.executor_id).map(UserId::new).transpose()?;
        Ok(TaskDraft {
            guild_id: GuildId::new(self.guild_id)?,
            title: TaskTitle::new(self.title)?,
            description,
            priority,
            author_id: UserId::new(self.author_id)?,
            executor_id,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum DescriptionUpdate {
    #[default]
    Keep,
    Set(String),
    Clear,
}

/// Request payload for a partial task update.
///
/// Fields that are never set, or set to blank text, stay unchanged. The
/// description is cleared only through [`UpdateTaskRequest::clear_description`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTaskRequest {
    guild_id: String,
    caller_id: String,
    number: String,
    title: Option<String>,
    description: DescriptionUpdate,
    priority: Option<String>,
    executor_id: Option<String>,
}

impl UpdateTaskRequest {
    /// Creates an update request addressing one task.
    #[must_use]
    pub fn new(
        guild_id: impl Into<String>,
        caller_id: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            caller_id: caller_id.into(),
            number: number.into(),
            title: None,
            description: DescriptionUpdate::Keep,
            priority: None,
            executor_id: None,
        }
    }

    /// Sets a new title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets a new description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = DescriptionUpdate::Set(description.into());
        self
    }

    /// Clears the description.
    #[must_use]
    pub fn clear_description(mut self) -> Self {
        self.description = DescriptionUpdate::Clear;
        self
    }

    /// Sets a new priority.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets a new executor.
    #[must_use]
    pub fn with_executor(mut self, executor_id: impl Into<String>) -> Self {
        self.executor_id = Some(executor_id.into());
        self
    }

    fn changes(&self) -> Result<TaskChanges, TaskDomainError> {
        let description = match &self.description {
            DescriptionUpdate::Keep => None,
            DescriptionUpdate::Clear => Some(TaskDescription::empty()),
            DescriptionUpdate::Set(text) if text.trim().is_empty() => None,
            DescriptionUpdate::Set(text) => Some(TaskDescription::new(text.as_str())?),
        };
        Ok(TaskChanges {
            title: non_blank(self.title.clone())
                .map(TaskTitle::new)
                .transpose()?,
            description,
            priority: non_blank(self.priority.clone())
                .map(|raw| Priority::try_from(raw.as_str()))
                .transpose()?,
            executor_id: non_blank(self.executor_id.clone())
                .map(UserId::new)
                .transpose()?,
        })
    }
}

/// Query for the tasks a member is involved in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListTasksQuery {
    guild_id: String,
    user_id: String,
    number: Option<String>,
}

impl ListTasksQuery {
    /// Lists every task in the guild involving the user.
    #[must_use]
    pub fn new(guild_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            guild_id: guild_id.into(),
            user_id: user_id.into(),
            number: None,
        }
    }

    /// Restricts the listing to one task number; blank input means all.
    #[must_use]
    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }
}

/// Request payload for deleting a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTaskRequest {
    guild_id: String,
    caller_id: String,
    number: String,
}

impl DeleteTaskRequest {
    /// Creates a delete request.
    #[must_use]
    pub fn new(
        guild_id: impl Into<String>,
        caller_id: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            guild_id: guild_id.into(),
            caller_id: caller_id.into(),
            number: number.into(),
        }
    }
}

/// Service-level errors for task operations.
#[derive(Debug, Error)]
pub enum TaskServiceError {
    /// Input validation failed.
    #[error(transparent)]
    Domain(#[from] TaskDomainError),

    /// No task matched, or the caller may not act on it.
    #[error("task {number} not found in guild {guild_id}")]
    NotFound {
        /// Guild that was searched.
        guild_id: GuildId,
        /// Requested task number.
        number: TaskNumber,
    },

    /// Repository operation failed.
    #[error(transparent)]
    Repository(TaskRepositoryError),
}

impl From<TaskRepositoryError> for TaskServiceError {
    fn from(err: TaskRepositoryError) -> Self {
        match err {
            TaskRepositoryError::NotFound { guild_id, number } => {
                Self::NotFound { guild_id, number }
            }
            other => Self::Repository(other),
        }
    }
}

/// Result type for task service operations.
pub type TaskServiceResult<T> = Result<T, TaskServiceError>;

/// Task orchestration service.
pub struct TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> Clone for TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<R, C> TaskService<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new task service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Validates the request and stores a task under the next guild number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] for invalid input and
    /// [`TaskServiceError::Repository`] when persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> TaskServiceResult<Task> {
        let draft = request.into_draft()?;
        let task = NewTask::new(draft, &*self.clock);
        Ok(self.repository.create(&task).await?)
    }

    /// Applies a partial update to a task the caller authored or executes.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when the task is missing or the
    /// caller is neither author nor executor, [`TaskServiceError::Domain`]
    /// for invalid input, and [`TaskServiceError::Repository`] when
    /// persistence fails.
    pub async fn update(&self, request: UpdateTaskRequest) -> TaskServiceResult<Task> {
        let guild_id = GuildId::new(request.guild_id.as_str())?;
        let caller = UserId::new(request.caller_id.as_str())?;
        let number = TaskNumber::parse(&request.number)?;
        let changes = request.changes()?;

        Ok(self
            .repository
            .update_for_member(&guild_id, number, &caller, &changes, self.clock.utc())
            .await?)
    }

    /// Lists the guild's tasks the user authored or executes, ascending by
    /// task number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::Domain`] for invalid input and
    /// [`TaskServiceError::Repository`] when persistence fails.
    pub async fn list(&self, query: ListTasksQuery) -> TaskServiceResult<Vec<Task>> {
        let guild_id = GuildId::new(query.guild_id)?;
        let user = UserId::new(query.user_id)?;
        let number = non_blank(query.number)
            .map(|raw| TaskNumber::parse(&raw))
            .transpose()?;
        Ok(self
            .repository
            .list_for_member(&guild_id, &user, number)
            .await?)
    }

    /// Deletes a task authored by the caller and returns its number.
    ///
    /// # Errors
    ///
    /// Returns [`TaskServiceError::NotFound`] when no task with that number
    /// was authored by the caller, [`TaskServiceError::Domain`] for invalid
    /// input, and [`TaskServiceError::Repository`] when persistence fails.
    pub async fn delete(&self, request: DeleteTaskRequest) -> TaskServiceResult<TaskNumber> {
        let guild_id = GuildId::new(request.guild_id)?;
        let caller = UserId::new(request.caller_id)?;
        let number = TaskNumber::parse(&request.number)?;
        self.repository
            .delete_authored(&guild_id, number, &caller)
            .await?;
        Ok(number)
    }
}
