//! Shared world state for task numbering BDD scenarios.

use std::sync::Arc;

use mockable::DefaultClock;
use rstest::fixture;
use taskchord::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskNumber},
    services::{TaskService, TaskServiceResult},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<InMemoryTaskRepository, DefaultClock>;

/// Scenario world for task numbering behaviour tests.
pub struct TaskWorld {
    pub service: TestTaskService,
    pub created_numbers: Vec<u64>,
    pub last_update: Option<TaskServiceResult<Task>>,
    pub last_delete: Option<TaskServiceResult<TaskNumber>>,
}

impl TaskWorld {
    /// Creates a world over an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        let service = TaskService::new(
            Arc::new(InMemoryTaskRepository::new()),
            Arc::new(DefaultClock),
        );
        Self {
            service,
            created_numbers: Vec::new(),
            last_update: None,
            last_delete: None,
        }
    }
}

impl Default for TaskWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> TaskWorld {
    TaskWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
