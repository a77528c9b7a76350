//! Diesel row models for task persistence.

use super::schema::tasks;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning guild.
    pub guild_id: String,
    /// Guild-scoped task number.
    pub task_number: i64,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task priority.
    pub priority: String,
    /// Creating user.
    pub author_id: String,
    /// Assigned user.
    pub executor_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Internal task identifier.
    pub id: uuid::Uuid,
    /// Owning guild.
    pub guild_id: String,
    /// Allocated guild-scoped task number.
    pub task_number: i64,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task priority.
    pub priority: String,
    /// Creating user.
    pub author_id: String,
    /// Assigned user.
    pub executor_id: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Partial changeset for the mutable task columns.
///
/// `None` fields are left out of the `SET` clause.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChangesetRow {
    /// Task title.
    pub title: Option<String>,
    /// Task description.
    pub description: Option<String>,
    /// Task priority.
    pub priority: Option<String>,
    /// Assigned user.
    pub executor_id: Option<String>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Result row of the counter allocation statement.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub struct AllocatedNumberRow {
    /// Number handed out to the caller.
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub last_number: i64,
}
