//! Task controller.

use super::{ControllerError, ControllerResult, Operation};
use crate::task::{
    domain::{Task, TaskNumber},
    ports::TaskRepository,
    services::{
        CreateTaskRequest, DeleteTaskRequest, ListTasksQuery, TaskService, TaskServiceError,
        UpdateTaskRequest,
    },
};
use mockable::Clock;

/// Logs a service failure and maps it to the caller-facing taxonomy.
fn translate(err: TaskServiceError, operation: Operation) -> ControllerError {
    match err {
        TaskServiceError::Domain(cause) => {
            tracing::debug!(%operation, error = %cause, "rejected invalid task input");
            ControllerError::Validation(cause.to_string())
        }
        TaskServiceError::NotFound { guild_id, number } => {
            tracing::debug!(%operation, %guild_id, task_number = %number, "task not found");
            ControllerError::NotFound { number }
        }
        TaskServiceError::Repository(cause) => {
            tracing::error!(%operation, error = %cause, "task persistence failed");
            ControllerError::Persistence { operation }
        }
    }
}

/// Entry point for task operations from any caller surface.
pub struct TaskController<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    service: TaskService<R, C>,
}

impl<R, C> Clone for TaskController<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

impl<R, C> TaskController<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a controller over a task service.
    #[must_use]
    pub const fn new(service: TaskService<R, C>) -> Self {
        Self { service }
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`] or
    /// [`ControllerError::Persistence`].
    pub async fn create(&self, request: CreateTaskRequest) -> ControllerResult<Task> {
        let task = self
            .service
            .create(request)
            .await
            .map_err(|err| translate(err, Operation::CreateTask))?;
        tracing::info!(
            guild_id = %task.guild_id(),
            task_number = %task.number(),
            author_id = %task.author_id(),
            "task created"
        );
        Ok(task)
    }

    /// Lists the caller's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`] or
    /// [`ControllerError::Persistence`].
    pub async fn list(&self, query: ListTasksQuery) -> ControllerResult<Vec<Task>> {
        self.service
            .list(query)
            .await
            .map_err(|err| translate(err, Operation::ListTasks))
    }

    /// Updates a task.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`], [`ControllerError::NotFound`]
    /// or [`ControllerError::Persistence`].
    pub async fn update(&self, request: UpdateTaskRequest) -> ControllerResult<Task> {
        let task = self
            .service
            .update(request)
            .await
            .map_err(|err| translate(err, Operation::UpdateTask))?;
        tracing::info!(
            guild_id = %task.guild_id(),
            task_number = %task.number(),
            "task updated"
        );
        Ok(task)
    }

    /// Deletes a task and returns its number.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`], [`ControllerError::NotFound`]
    /// or [`ControllerError::Persistence`].
    pub async fn delete(&self, request: DeleteTaskRequest) -> ControllerResult<TaskNumber> {
        let number = self
            .service
            .delete(request)
            .await
            .map_err(|err| translate(err, Operation::DeleteTask))?;
        tracing::info!(task_number = %number, "task deleted");
        Ok(number)
    }
}
