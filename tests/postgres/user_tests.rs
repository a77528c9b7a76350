//! Login upsert and migration tests against `PostgreSQL`.

use crate::postgres::helpers::{BoxError, TemporaryDatabase, temporary_database, test_runtime};
use chrono::{TimeDelta, Utc};
use rstest::rstest;
use taskchord::postgres::apply_migrations;
use taskchord::user::{
    adapters::postgres::PostgresUserRepository,
    domain::{ExternalUserId, UserProfile},
    ports::UserRepository,
};

#[rstest]
fn repeated_login_keeps_one_record_with_latest_profile(
    temporary_database: Result<TemporaryDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresUserRepository::new(database.pool()?);
    let external_id = ExternalUserId::new("42")?;
    let first_seen = Utc::now();
    let later = first_seen + TimeDelta::minutes(5);
    let rt = test_runtime()?;

    rt.block_on(async {
        let created = repo
            .upsert(
                &UserProfile::new(external_id.clone(), "alice")?
                    .with_email(Some("alice@example.com".to_owned())),
                first_seen,
            )
            .await?;
        let refreshed = repo
            .upsert(&UserProfile::new(external_id.clone(), "Alice A.")?, later)
            .await?;
        let stored = repo
            .find_by_external_id(&external_id)
            .await?
            .ok_or("user should exist")?;

        assert_eq!(refreshed.id(), created.id());
        assert_eq!(stored.id(), created.id());
        assert_eq!(stored.profile().username(), "Alice A.");
        assert_eq!(stored.profile().email(), None);
        assert!(stored.updated_at() > stored.created_at());
        Ok(())
    })
}

#[rstest]
fn unknown_user_is_absent(
    temporary_database: Result<TemporaryDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresUserRepository::new(database.pool()?);
    let rt = test_runtime()?;

    let found = rt.block_on(repo.find_by_external_id(&ExternalUserId::new("nobody")?))?;

    assert!(found.is_none());
    Ok(())
}

#[rstest]
fn migrations_can_be_reapplied(
    temporary_database: Result<TemporaryDatabase, BoxError>,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let pool = database.pool()?;
    let mut conn = pool.get()?;

    apply_migrations(&mut conn)?;
    apply_migrations(&mut conn)?;
    Ok(())
}
