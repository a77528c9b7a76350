//! Diesel schema for task persistence.

diesel::table! {
    /// Task records scoped to a guild.
    tasks (id) {
        /// Internal task identifier.
        id -> Uuid,
        /// Guild that owns the task.
        #[max_length = 64]
        guild_id -> Varchar,
        /// Guild-scoped task number.
        task_number -> Int8,
        /// Task title.
        #[max_length = 256]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Task priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Creating user.
        #[max_length = 64]
        author_id -> Varchar,
        /// Assigned user.
        #[max_length = 64]
        executor_id -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}
