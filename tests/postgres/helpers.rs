//! Shared test helpers for `PostgreSQL` integration tests.

use diesel::prelude::*;
use mockable::DefaultClock;
pub use pg_embedded_setup_unpriv::{TestCluster, test_support::shared_test_cluster};
use rstest::fixture;
use taskchord::postgres::{PgPool, apply_migrations, build_pool};
use taskchord::task::domain::{
    GuildId, NewTask, Priority, TaskDescription, TaskDraft, TaskTitle, UserId,
};
use tokio::runtime::Runtime;
use uuid::Uuid;

/// Boxed error used by fallible test bodies.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "taskchord_test_template";

/// Creates a multi-threaded runtime so concurrent writers really overlap.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn test_runtime() -> Result<Runtime, BoxError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()?)
}

/// Ensures the template database exists with every migration applied.
fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            apply_migrations(&mut conn).map_err(|e| eyre::eyre!("migration failed: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// A database cloned from the migrated template, dropped with the guard.
pub struct TemporaryDatabase {
    cluster: &'static TestCluster,
    name: String,
    pool: Option<PgPool>,
}

impl TemporaryDatabase {
    /// Clones the template into a uniquely named database.
    ///
    /// # Errors
    ///
    /// Returns an error if the template or the clone cannot be created.
    pub fn create(cluster: &'static TestCluster) -> Result<Self, BoxError> {
        ensure_template(cluster)?;
        let name = format!("taskchord_test_{}", Uuid::new_v4().simple());
        cluster
            .create_database_from_template(name.as_str(), TEMPLATE_DB)
            .map_err(|e| Box::new(e) as BoxError)?;
        let mut database = Self {
            cluster,
            name,
            pool: None,
        };
        let url = cluster.connection().database_url(&database.name);
        database.pool = Some(build_pool(&url, 4)?);
        Ok(database)
    }

    /// Pool connected to the temporary database.
    ///
    /// # Errors
    ///
    /// Returns an error once the pool has been released.
    pub fn pool(&self) -> Result<PgPool, BoxError> {
        self.pool
            .clone()
            .ok_or_else(|| "temporary database pool already released".into())
    }
}

impl Drop for TemporaryDatabase {
    fn drop(&mut self) {
        drop(self.pool.take());
        if let Err(e) = self.cluster.drop_database(self.name.as_str()) {
            tracing::warn!(database = %self.name, error = %e, "failed to drop test database");
        }
    }
}

/// Temporary database on the shared embedded cluster.
#[fixture]
pub fn temporary_database(
    shared_test_cluster: &'static TestCluster,
) -> Result<TemporaryDatabase, BoxError> {
    TemporaryDatabase::create(shared_test_cluster)
}

/// Provides a [`DefaultClock`] for test fixtures.
#[fixture]
pub fn clock() -> DefaultClock {
    DefaultClock
}

/// Builds an unnumbered task for `guild`.
///
/// # Errors
///
/// Returns an error if a field fails validation.
pub fn new_task(
    clock: &DefaultClock,
    guild: &str,
    author: &str,
    executor: Option<&str>,
    title: &str,
) -> Result<NewTask, BoxError> {
    let draft = TaskDraft {
        guild_id: GuildId::new(guild)?,
        title: TaskTitle::new(title)?,
        description: TaskDescription::new(format!("{title} details"))?,
        priority: Priority::Medium,
        author_id: UserId::new(author)?,
        executor_id: executor.map(UserId::new).transpose()?,
    };
    Ok(NewTask::new(draft, clock))
}
