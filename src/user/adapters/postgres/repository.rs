//! `PostgreSQL` repository implementation for users.

use super::schema::users;
use crate::postgres::{PgPool, get_conn_with, run_blocking_with};
use crate::user::{
    domain::{ExternalUserId, PersistedUserData, User, UserProfile, UserRecordId},
    ports::{UserRepository, UserRepositoryError, UserRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::upsert::excluded;
use uuid::Uuid;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct UserRow {
    id: Uuid,
    external_id: String,
    username: String,
    email: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
struct NewUserRow {
    id: Uuid,
    external_id: String,
    username: String,
    email: Option<String>,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// `PostgreSQL`-backed user repository.
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> UserRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> UserRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        run_blocking_with(
            move || {
                let mut connection = get_conn_with(&pool, UserRepositoryError::persistence)?;
                f(&mut connection)
            },
            UserRepositoryError::persistence,
        )
        .await
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn upsert(
        &self,
        profile: &UserProfile,
        now: DateTime<Utc>,
    ) -> UserRepositoryResult<User> {
        let row = NewUserRow {
            id: UserRecordId::new().into_inner(),
            external_id: profile.external_id().as_str().to_owned(),
            username: profile.username().to_owned(),
            email: profile.email().map(str::to_owned),
            avatar_url: profile.avatar_url().map(str::to_owned),
            created_at: now,
            updated_at: now,
        };
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(users::table)
                .values(&row)
                .on_conflict(users::external_id)
                .do_update()
                .set((
                    users::username.eq(excluded(users::username)),
                    users::email.eq(excluded(users::email)),
                    users::avatar_url.eq(excluded(users::avatar_url)),
                    users::updated_at.eq(excluded(users::updated_at)),
                ))
                .returning(UserRow::as_returning())
                .get_result::<UserRow>(connection)
                .map_err(UserRepositoryError::persistence)?;
            row_to_user(stored)
        })
        .await
    }

    async fn find_by_external_id(
        &self,
        external_id: &ExternalUserId,
    ) -> UserRepositoryResult<Option<User>> {
        let wanted = external_id.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = users::table
                .filter(users::external_id.eq(wanted))
                .select(UserRow::as_select())
                .first::<UserRow>(connection)
                .optional()
                .map_err(UserRepositoryError::persistence)?;
            row.map(row_to_user).transpose()
        })
        .await
    }
}

fn row_to_user(row: UserRow) -> UserRepositoryResult<User> {
    let external_id =
        ExternalUserId::new(row.external_id).map_err(UserRepositoryError::persistence)?;
    let profile = UserProfile::new(external_id, row.username)
        .map_err(UserRepositoryError::persistence)?
        .with_email(row.email)
        .with_avatar_url(row.avatar_url);
    Ok(User::from_persisted(PersistedUserData {
        id: UserRecordId::from_uuid(row.id),
        profile,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
