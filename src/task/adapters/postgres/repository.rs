//! `PostgreSQL` repository implementation for task storage.

use super::{
    models::{AllocatedNumberRow, NewTaskRow, TaskChangesetRow, TaskRow},
    schema::tasks,
};
use crate::postgres::{PgPool, get_conn_with, run_blocking_with};
use crate::task::{
    domain::{
        GuildId, NewTask, PersistedTaskData, Priority, Task, TaskChanges, TaskDescription, TaskId,
        TaskNumber, TaskTitle, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorInformation, DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = PgPool;

/// Hands out the next number for a guild.
///
/// The first allocation for a guild seeds the counter from the highest stored
/// task number; later allocations increment the counter row. The conflicting
/// upsert takes a row lock, so concurrent creators in one guild queue behind
/// each other until the surrounding transaction ends.
const ALLOCATE_NUMBER_SQL: &str = concat!(
    "INSERT INTO guild_task_counters (guild_id, last_number) ",
    "SELECT $1, COALESCE(MAX(task_number), 0) + 1 FROM tasks WHERE guild_id = $1 ",
    "ON CONFLICT (guild_id) DO UPDATE ",
    "SET last_number = guild_task_counters.last_number + 1 ",
    "RETURNING last_number",
);

const GUILD_NUMBER_UNIQUE_INDEX: &str = "idx_tasks_guild_number_unique";

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, TaskRepositoryError::persistence)?;
                f(&mut connection)
            },
            TaskRepositoryError::persistence,
        )
        .await
    }
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn create(&self, task: &NewTask) -> TaskRepositoryResult<Task> {
        let pending = task.clone();
        self.run_blocking(move |connection| {
            connection.transaction::<_, TaskRepositoryError, _>(|tx| {
                let number = allocate_number(tx, pending.guild_id())?;
                let row = to_new_row(&pending, number)?;
                diesel::insert_into(tasks::table)
                    .values(&row)
                    .execute(tx)
                    .map_err(|err| map_insert_error(err, &pending, number))?;
                Ok(pending.into_task(number))
            })
        })
        .await
    }

    async fn find(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
    ) -> TaskRepositoryResult<Option<Task>> {
        let guild = guild_id.as_str().to_owned();
        let task_number = to_db_number(number)?;
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::guild_id.eq(guild))
                .filter(tasks::task_number.eq(task_number))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_for_member(
        &self,
        guild_id: &GuildId,
        user: &UserId,
        number: Option<TaskNumber>,
    ) -> TaskRepositoryResult<Vec<Task>> {
        let guild = guild_id.as_str().to_owned();
        let member = user.as_str().to_owned();
        let task_number = number.map(to_db_number).transpose()?;
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .select(TaskRow::as_select())
                .filter(tasks::guild_id.eq(guild))
                .filter(
                    tasks::author_id
                        .eq(member.clone())
                        .or(tasks::executor_id.eq(member)),
                )
                .into_boxed();
            if let Some(wanted) = task_number {
                query = query.filter(tasks::task_number.eq(wanted));
            }
            let rows = query
                .order(tasks::task_number.asc())
                .load::<TaskRow>(connection)?;
            rows.into_iter().map(row_to_task).collect()
        })
        .await
    }

    async fn update_for_member(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
        caller: &UserId,
        changes: &TaskChanges,
        updated_at: DateTime<Utc>,
    ) -> TaskRepositoryResult<Task> {
        let guild = guild_id.clone();
        let task_number = to_db_number(number)?;
        let member = caller.as_str().to_owned();
        let changeset = to_changeset(changes, updated_at);
        self.run_blocking(move |connection| {
            let row = diesel::update(
                tasks::table
                    .filter(tasks::guild_id.eq(guild.as_str()))
                    .filter(tasks::task_number.eq(task_number))
                    .filter(
                        tasks::author_id
                            .eq(member.clone())
                            .or(tasks::executor_id.eq(member)),
                    ),
            )
            .set(&changeset)
            .returning(TaskRow::as_returning())
            .get_result::<TaskRow>(connection)
            .optional()?;
            row.map(row_to_task)
                .transpose()?
                .ok_or_else(|| TaskRepositoryError::not_found(&guild, number))
        })
        .await
    }

    async fn delete_authored(
        &self,
        guild_id: &GuildId,
        number: TaskNumber,
        author: &UserId,
    ) -> TaskRepositoryResult<()> {
        let guild = guild_id.clone();
        let task_number = to_db_number(number)?;
        let author_id = author.as_str().to_owned();
        self.run_blocking(move |connection| {
            let affected = diesel::delete(
                tasks::table
                    .filter(tasks::guild_id.eq(guild.as_str()))
                    .filter(tasks::task_number.eq(task_number))
                    .filter(tasks::author_id.eq(author_id)),
            )
            .execute(connection)?;
            if affected == 0 {
                return Err(TaskRepositoryError::not_found(&guild, number));
            }
            Ok(())
        })
        .await
    }
}

fn allocate_number(
    connection: &mut PgConnection,
    guild_id: &GuildId,
) -> TaskRepositoryResult<TaskNumber> {
    let allocated = diesel::sql_query(ALLOCATE_NUMBER_SQL)
        .bind::<diesel::sql_types::Text, _>(guild_id.as_str())
        .get_result::<AllocatedNumberRow>(connection)?;
    from_db_number(allocated.last_number)
}

fn to_db_number(number: TaskNumber) -> TaskRepositoryResult<i64> {
    i64::try_from(number.value()).map_err(TaskRepositoryError::persistence)
}

fn from_db_number(value: i64) -> TaskRepositoryResult<TaskNumber> {
    let unsigned = u64::try_from(value).map_err(TaskRepositoryError::persistence)?;
    TaskNumber::new(unsigned).map_err(TaskRepositoryError::persistence)
}

fn to_new_row(task: &NewTask, number: TaskNumber) -> TaskRepositoryResult<NewTaskRow> {
    Ok(NewTaskRow {
        id: task.id().into_inner(),
        guild_id: task.guild_id().as_str().to_owned(),
        task_number: to_db_number(number)?,
        title: task.title().as_str().to_owned(),
        description: task.description().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        author_id: task.author_id().as_str().to_owned(),
        executor_id: task.executor_id().as_str().to_owned(),
        created_at: task.created_at(),
        updated_at: task.created_at(),
    })
}

fn to_changeset(changes: &TaskChanges, updated_at: DateTime<Utc>) -> TaskChangesetRow {
    TaskChangesetRow {
        title: changes.title.as_ref().map(|title| title.as_str().to_owned()),
        description: changes
            .description
            .as_ref()
            .map(|description| description.as_str().to_owned()),
        priority: changes.priority.map(|priority| priority.as_str().to_owned()),
        executor_id: changes
            .executor_id
            .as_ref()
            .map(|executor| executor.as_str().to_owned()),
        updated_at,
    }
}

fn row_to_task(row: TaskRow) -> TaskRepositoryResult<Task> {
    let TaskRow {
        id,
        guild_id,
        task_number,
        title,
        description,
        priority,
        author_id,
        executor_id,
        created_at,
        updated_at,
    } = row;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        guild_id: GuildId::new(guild_id).map_err(TaskRepositoryError::persistence)?,
        number: from_db_number(task_number)?,
        title: TaskTitle::new(title).map_err(TaskRepositoryError::persistence)?,
        description: TaskDescription::new(description)
            .map_err(TaskRepositoryError::persistence)?,
        priority: Priority::try_from(priority.as_str())
            .map_err(TaskRepositoryError::persistence)?,
        author_id: UserId::new(author_id).map_err(TaskRepositoryError::persistence)?,
        executor_id: UserId::new(executor_id).map_err(TaskRepositoryError::persistence)?,
        created_at,
        updated_at,
    };
    Ok(Task::from_persisted(data))
}

fn map_insert_error(err: DieselError, task: &NewTask, number: TaskNumber) -> TaskRepositoryError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, ref info)
            if is_guild_number_unique_violation(info.as_ref()) =>
        {
            TaskRepositoryError::DuplicateNumber {
                guild_id: task.guild_id().clone(),
                number,
            }
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            TaskRepositoryError::DuplicateTask(task.id())
        }
        _ => TaskRepositoryError::persistence(err),
    }
}

fn is_guild_number_unique_violation(info: &dyn DatabaseErrorInformation) -> bool {
    info.constraint_name()
        .is_some_and(|name| name == GUILD_NUMBER_UNIQUE_INDEX)
}
