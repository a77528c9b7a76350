//! Controller layer shared by the chat and HTTP surfaces.
//!
//! Controllers call the services, log the outcome with structured fields,
//! and collapse service errors into [`ControllerError`]. Storage and
//! provider details are logged here and never reach callers.

mod login;
mod task;

pub use login::LoginController;
pub use task::TaskController;

use crate::task::domain::TaskNumber;
use std::fmt;
use thiserror::Error;

/// Operation that a controller call performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Task creation.
    CreateTask,
    /// Task listing or lookup.
    ListTasks,
    /// Task update.
    UpdateTask,
    /// Task deletion.
    DeleteTask,
    /// OAuth login.
    Login,
}

impl Operation {
    /// Verb used in user-facing failure messages.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        match self {
            Self::CreateTask => "create",
            Self::ListTasks => "retrieve",
            Self::UpdateTask => "update",
            Self::DeleteTask => "delete",
            Self::Login => "log in",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateTask => "create_task",
            Self::ListTasks => "list_tasks",
            Self::UpdateTask => "update_task",
            Self::DeleteTask => "delete_task",
            Self::Login => "login",
        };
        f.write_str(name)
    }
}

/// Caller-facing error taxonomy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ControllerError {
    /// The input was rejected.
    #[error("{0}")]
    Validation(String),

    /// No matching task, or the caller may not act on it.
    #[error("task #{number} was not found")]
    NotFound {
        /// Requested task number.
        number: TaskNumber,
    },

    /// Storage failed; details were logged.
    #[error("failed to {} due to a storage error", .operation.verb())]
    Persistence {
        /// Operation that failed.
        operation: Operation,
    },

    /// The identity provider failed; details were logged.
    #[error("identity provider request failed")]
    Upstream,
}

/// Result type for controller calls.
pub type ControllerResult<T> = Result<T, ControllerError>;
