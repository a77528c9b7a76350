//! Domain model for guild-scoped tasks.
//!
//! Tasks are identified towards callers by a guild and a guild-local task
//! number. The domain keeps validation and ownership rules here and leaves
//! number allocation to the repository, which must do it atomically.

mod error;
mod ids;
mod task;

pub use error::{ParsePriorityError, TaskDomainError};
pub use ids::{GuildId, TaskId, TaskNumber, UserId};
pub use task::{
    NewTask, PersistedTaskData, Priority, Task, TaskChanges, TaskDescription, TaskDraft, TaskTitle,
};
