//! Application services for guild-scoped task management.

mod tasks;

pub use tasks::{
    CreateTaskRequest, DeleteTaskRequest, ListTasksQuery, TaskService, TaskServiceError,
    TaskServiceResult, UpdateTaskRequest,
};
