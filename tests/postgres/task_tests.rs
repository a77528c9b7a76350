//! Guild numbering and task lifecycle tests for `PostgresTaskRepository`.

use crate::postgres::helpers::{
    BoxError, TemporaryDatabase, clock, new_task, temporary_database, test_runtime,
};
use chrono::Utc;
use mockable::DefaultClock;
use rstest::rstest;
use taskchord::task::{
    adapters::postgres::PostgresTaskRepository,
    domain::{
        GuildId, Priority, Task, TaskChanges, TaskDescription, TaskNumber, TaskTitle, UserId,
    },
    ports::{TaskRepository, TaskRepositoryError},
};
use tokio::task::JoinSet;

fn numbers(tasks: &[Task]) -> Vec<u64> {
    tasks.iter().map(|task| task.number().value()).collect()
}

#[rstest]
fn numbering_starts_at_one_in_each_guild(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let rt = test_runtime()?;

    rt.block_on(async {
        let first = repo.create(&new_task(&clock, "g1", "u1", None, "one")?).await?;
        let second = repo.create(&new_task(&clock, "g1", "u1", None, "two")?).await?;
        let elsewhere = repo.create(&new_task(&clock, "g2", "u1", None, "three")?).await?;

        assert_eq!(first.number().value(), 1);
        assert_eq!(second.number().value(), 2);
        assert_eq!(elsewhere.number().value(), 1);
        assert_eq!(first.executor_id(), first.author_id());
        Ok(())
    })
}

#[rstest]
fn concurrent_creates_receive_distinct_numbers(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let rt = test_runtime()?;

    rt.block_on(async {
        let mut creators = JoinSet::new();
        for index in 0..8 {
            let pending = new_task(&clock, "g1", &format!("u{index}"), None, "race")?;
            let shared = repo.clone();
            creators.spawn(async move { shared.create(&pending).await });
        }
        let mut allocated = Vec::new();
        while let Some(joined) = creators.join_next().await {
            allocated.push(joined??.number().value());
        }
        allocated.sort_unstable();

        assert_eq!(allocated, (1..=8).collect::<Vec<u64>>());
        Ok(())
    })
}

#[rstest]
fn deleted_numbers_are_not_reused(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let guild = GuildId::new("g1")?;
    let author = UserId::new("u1")?;
    let rt = test_runtime()?;

    rt.block_on(async {
        repo.create(&new_task(&clock, "g1", "u1", None, "one")?).await?;
        let last = repo.create(&new_task(&clock, "g1", "u1", None, "two")?).await?;
        repo.delete_authored(&guild, last.number(), &author).await?;
        let next = repo.create(&new_task(&clock, "g1", "u1", None, "three")?).await?;

        assert_eq!(next.number().value(), 3);
        assert_eq!(repo.find(&guild, last.number()).await?, None);
        Ok(())
    })
}

#[rstest]
fn listing_covers_authored_and_assigned_tasks_in_order(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let guild = GuildId::new("g1")?;
    let member = UserId::new("u1")?;
    let rt = test_runtime()?;

    rt.block_on(async {
        repo.create(&new_task(&clock, "g1", "u1", None, "mine")?).await?;
        repo.create(&new_task(&clock, "g1", "u2", Some("u1"), "assigned")?)
            .await?;
        repo.create(&new_task(&clock, "g1", "u2", None, "theirs")?).await?;
        repo.create(&new_task(&clock, "g2", "u1", None, "other guild")?)
            .await?;

        let all = repo.list_for_member(&guild, &member, None).await?;
        let single = repo
            .list_for_member(&guild, &member, Some(TaskNumber::new(2)?))
            .await?;
        let hidden = repo
            .list_for_member(&guild, &member, Some(TaskNumber::new(3)?))
            .await?;

        assert_eq!(numbers(&all), vec![1, 2]);
        assert_eq!(numbers(&single), vec![2]);
        assert!(hidden.is_empty());
        Ok(())
    })
}

#[rstest]
fn update_persists_only_changed_fields(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let rt = test_runtime()?;

    rt.block_on(async {
        let task = repo.create(&new_task(&clock, "g1", "u1", None, "edit me")?).await?;
        let changes = TaskChanges {
            description: Some(TaskDescription::empty()),
            priority: Some(Priority::Low),
            executor_id: Some(UserId::new("u2")?),
            ..TaskChanges::default()
        };

        let returned = repo
            .update_for_member(
                task.guild_id(),
                task.number(),
                task.author_id(),
                &changes,
                Utc::now(),
            )
            .await?;
        let stored = repo
            .find(task.guild_id(), task.number())
            .await?
            .ok_or("task should still exist")?;

        assert_eq!(returned, stored);
        assert_eq!(stored.title().as_str(), "edit me");
        assert!(stored.description().is_empty());
        assert_eq!(stored.priority(), Priority::Low);
        assert_eq!(stored.executor_id().as_str(), "u2");
        assert!(stored.updated_at() >= stored.created_at());
        Ok(())
    })
}

#[rstest]
fn concurrent_partial_updates_keep_every_field(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let rt = test_runtime()?;

    rt.block_on(async {
        let task = repo
            .create(&new_task(&clock, "g1", "u1", Some("u2"), "contested")?)
            .await?;
        let rename = TaskChanges {
            title: Some(TaskTitle::new("renamed by author")?),
            ..TaskChanges::default()
        };
        let reprioritise = TaskChanges {
            priority: Some(Priority::High),
            ..TaskChanges::default()
        };

        let mut writers = JoinSet::new();
        for (caller, changes) in [("u1", rename), ("u2", reprioritise)] {
            let shared = repo.clone();
            let guild = task.guild_id().clone();
            let number = task.number();
            let member = UserId::new(caller)?;
            writers.spawn(async move {
                shared
                    .update_for_member(&guild, number, &member, &changes, Utc::now())
                    .await
            });
        }
        while let Some(joined) = writers.join_next().await {
            joined??;
        }
        let stored = repo
            .find(task.guild_id(), task.number())
            .await?
            .ok_or("task should still exist")?;

        assert_eq!(stored.title().as_str(), "renamed by author");
        assert_eq!(stored.priority(), Priority::High);
        assert_eq!(stored.description(), task.description());
        Ok(())
    })
}

#[rstest]
fn reassigned_executor_can_no_longer_update(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let former = UserId::new("u2")?;
    let rt = test_runtime()?;

    rt.block_on(async {
        let task = repo
            .create(&new_task(&clock, "g1", "u1", Some("u2"), "handover")?)
            .await?;
        let handover = TaskChanges {
            executor_id: Some(UserId::new("u3")?),
            ..TaskChanges::default()
        };
        repo.update_for_member(
            task.guild_id(),
            task.number(),
            &former,
            &handover,
            Utc::now(),
        )
        .await?;

        let late_edit = TaskChanges {
            title: Some(TaskTitle::new("too late")?),
            ..TaskChanges::default()
        };
        let result = repo
            .update_for_member(
                task.guild_id(),
                task.number(),
                &former,
                &late_edit,
                Utc::now(),
            )
            .await;
        let stored = repo
            .find(task.guild_id(), task.number())
            .await?
            .ok_or("task should still exist")?;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound { .. })));
        assert_eq!(stored.title().as_str(), "handover");
        assert_eq!(stored.executor_id().as_str(), "u3");
        Ok(())
    })
}

#[rstest]
fn delete_by_executor_is_not_found(
    temporary_database: Result<TemporaryDatabase, BoxError>,
    clock: DefaultClock,
) -> Result<(), BoxError> {
    let database = temporary_database?;
    let repo = PostgresTaskRepository::new(database.pool()?);
    let rt = test_runtime()?;

    rt.block_on(async {
        let task = repo
            .create(&new_task(&clock, "g1", "u1", Some("u2"), "guarded")?)
            .await?;

        let result = repo
            .delete_authored(task.guild_id(), task.number(), &UserId::new("u2")?)
            .await;

        assert!(matches!(result, Err(TaskRepositoryError::NotFound { .. })));
        assert!(repo.find(task.guild_id(), task.number()).await?.is_some());
        Ok(())
    })
}
