//! In-memory task repository for tests and local runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::task::{
    domain::{GuildId, NewTask, Task, TaskChanges, TaskId, TaskNumber, UserId},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};

/// Thread-safe in-memory task repository.
///
/// Number allocation and insert happen under one write lock, which gives the
/// same per-guild serialization the `PostgreSQL` counter row provides.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTaskRepository {
    state: Arc<RwLock<InMemoryTaskState>>,
}

#[derive(Debug, Default)]
struct InMemoryTaskState {
    tasks: HashMap<TaskId, Task>,
    number_index: HashMap<(GuildId, TaskNumber), TaskId>,
    counters: HashMap<GuildId, TaskNumber>,
}

impl InMemoryTaskRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> TaskRepositoryError {
    TaskRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

/// Next number for a guild: counter + 1, or highest stored number + 1 when
/// the guild has no counter yet.
fn next_number(state: &InMemoryTaskState, guild_id: &GuildId) -> TaskRepositoryResult<TaskNumber> {
    let last = state.counters.get(guild_id).copied().or_else(|| {
        state
            .number_index
            .keys()
            .filter(|(guild, _)| guild == guild_id)
            .map(|(_, number)| *number)
            .max()
    });
    match last {
        Some(number) => number.next().map_err(TaskRepositoryError::persistence),
        None => Ok(TaskNumber::FIRST),
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, task: &NewTask) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(TaskRepositoryError::DuplicateTask(task.id()));
        }

        let guild_id = task.guild_id().clone();
        let number = next_number(&state, &guild_id)?;
        let key = (guild_id.clone(), number);
        if state.number_index.contains_key(&key) {
            return Err(TaskRepositoryError::DuplicateNumber { guild_id, number });
        }

        let stored = task.clone().into_task(number);
        state.counters.insert(guild_id, number);
        state.number_index.insert(key, stored.id());
        state.tasks.insert(stored.id(), stored.clone());
        Ok(stored)
    }

    async fn find(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
    ) -> TaskRepositoryResult<Option<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let task = state
            .number_index
            .get(&(guild_id.clone(), number))
            .and_then(|id| state.tasks.get(id))
            .cloned();
        Ok(task)
    }

    async fn list_for_member(
        &self,
        guild_id: &GuildId,
        user: &UserId,
        number: Option<TaskNumber>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let state = self.state.read().map_err(lock_error)?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| task.guild_id() == guild_id && task.involves(user))
            .filter(|task| number.is_none_or(|wanted| task.number() == wanted))
            .cloned()
            .collect();
        tasks.sort_by_key(Task::number);
        Ok(tasks)
    }

    async fn update_for_member(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
        caller: &UserId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let mut state = self.state.write().map_err(lock_error)?;
        let task_id = state
            .number_index
            .get(&(guild_id.clone(), number))
            .copied()
            .ok_or_else(|| TaskRepositoryError::not_found(guild_id, number))?;
        let stored = state
            .tasks
            .get_mut(&task_id)
            .filter(|task| task.can_be_updated_by(caller))
            .ok_or_else(|| TaskRepositoryError::not_found(guild_id, number))?;
        stored.apply_at(changes.clone(), updated_at);
        Ok(stored.clone())
    }

    async fn delete_authored(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
        author: &UserId,
    ) -> TaskRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let key = (guild_id.clone(), number);
        let task_id = state
            .number_index
            .get(&key)
            .copied()
            .filter(|id| {
                state
                    .tasks
                    .get(id)
                    .is_some_and(|task| task.can_be_deleted_by(author))
            })
            .ok_or_else(|| TaskRepositoryError::not_found(guild_id, number))?;

        state.number_index.remove(&key);
        state.tasks.remove(&task_id);
        Ok(())
    }
}
