//! When steps for task numbering BDD scenarios.

use super::world::{TaskWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::when;
use taskchord::task::services::{CreateTaskRequest, DeleteTaskRequest, UpdateTaskRequest};
use tokio::task::JoinSet;

#[when(r#""{user}" creates a task titled "{title}" in guild "{guild}""#)]
fn create_titled_task(
    world: &mut TaskWorld,
    user: String,
    title: String,
    guild: String,
) -> Result<(), eyre::Report> {
    let task = run_async(world.service.create(CreateTaskRequest::new(guild, user, title)))
        .wrap_err("create task")?;
    world.created_numbers.push(task.number().value());
    Ok(())
}

#[when(r#"{count:u64} members create tasks in guild "{guild}" at the same time"#)]
fn concurrent_creates(world: &mut TaskWorld, count: u64, guild: String) -> Result<(), eyre::Report> {
    let service = world.service.clone();
    let numbers = run_async(async move {
        let mut creators = JoinSet::new();
        for member in 0..count {
            let request = CreateTaskRequest::new(guild.clone(), format!("member-{member}"), "race");
            let shared = service.clone();
            creators.spawn(async move { shared.create(request).await });
        }
        let mut allocated = Vec::new();
        while let Some(joined) = creators.join_next().await {
            let task = joined.wrap_err("join creator")?.wrap_err("concurrent create")?;
            allocated.push(task.number().value());
        }
        Ok::<_, eyre::Report>(allocated)
    })?;
    world.created_numbers.extend(numbers);
    Ok(())
}

#[when(r#""{user}" sets the priority of task {number:u64} in guild "{guild}" to "{priority}""#)]
fn set_priority(world: &mut TaskWorld, user: String, number: u64, guild: String, priority: String) {
    let request = UpdateTaskRequest::new(guild, user, number.to_string()).with_priority(priority);
    world.last_update = Some(run_async(world.service.update(request)));
}

#[when(r#""{user}" deletes task {number:u64} in guild "{guild}""#)]
fn delete_task(world: &mut TaskWorld, user: String, number: u64, guild: String) {
    let request = DeleteTaskRequest::new(guild, user, number.to_string());
    world.last_delete = Some(run_async(world.service.delete(request)));
}
