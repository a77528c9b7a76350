//! Then steps for task numbering BDD scenarios.

use super::world::TaskWorld;
use rstest_bdd_macros::then;
use taskchord::task::{domain::Priority, services::TaskServiceError};

#[then(r#"the created task numbers are "{expected}""#)]
fn created_numbers_are(world: &TaskWorld, expected: String) -> Result<(), eyre::Report> {
    let wanted = expected
        .split(',')
        .map(|raw| raw.trim().parse::<u64>())
        .collect::<Result<Vec<_>, _>>()?;
    if world.created_numbers != wanted {
        return Err(eyre::eyre!(
            "expected numbers {wanted:?}, found {:?}",
            world.created_numbers
        ));
    }
    Ok(())
}

#[then("every number from 1 to {count:u64} was handed out exactly once")]
fn numbers_are_consecutive(world: &TaskWorld, count: u64) -> Result<(), eyre::Report> {
    let mut allocated = world.created_numbers.clone();
    allocated.sort_unstable();
    let wanted: Vec<u64> = (1..=count).collect();
    if allocated != wanted {
        return Err(eyre::eyre!("expected {wanted:?}, found {allocated:?}"));
    }
    Ok(())
}

#[then(r#"the update succeeded with priority "{priority}""#)]
fn update_succeeded(world: &TaskWorld, priority: String) -> Result<(), eyre::Report> {
    let result = world
        .last_update
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing update result in scenario world"))?;
    let task = result
        .as_ref()
        .map_err(|err| eyre::eyre!("unexpected update failure: {err}"))?;
    let wanted = Priority::try_from(priority.as_str())?;
    if task.priority() != wanted {
        return Err(eyre::eyre!(
            "expected priority {wanted}, found {}",
            task.priority()
        ));
    }
    Ok(())
}

#[then("the deletion was rejected as not found")]
fn deletion_rejected(world: &TaskWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_delete
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing delete result in scenario world"))?;
    if !matches!(result, Err(TaskServiceError::NotFound { .. })) {
        return Err(eyre::eyre!("expected not-found deletion, got {result:?}"));
    }
    Ok(())
}

#[then("the deletion succeeded")]
fn deletion_succeeded(world: &TaskWorld) -> Result<(), eyre::Report> {
    let result = world
        .last_delete
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing delete result in scenario world"))?;
    result
        .as_ref()
        .map(|_| ())
        .map_err(|err| eyre::eyre!("unexpected delete failure: {err}"))
}

#[then("the last created task number is {number:u64}")]
fn last_created_number(world: &TaskWorld, number: u64) -> Result<(), eyre::Report> {
    match world.created_numbers.last() {
        Some(&last) if last == number => Ok(()),
        other => Err(eyre::eyre!("expected last number {number}, found {other:?}")),
    }
}
