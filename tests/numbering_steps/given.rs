//! Given steps for task numbering BDD scenarios.

use super::world::{TaskWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskchord::task::services::CreateTaskRequest;

#[given("an empty task board")]
fn empty_task_board(world: &mut TaskWorld) {
    world.created_numbers.clear();
}

#[given(r#""{user}" created a task in guild "{guild}" assigned to "{executor}""#)]
fn task_created_with_executor(
    world: &mut TaskWorld,
    user: String,
    guild: String,
    executor: String,
) -> Result<(), eyre::Report> {
    let request = CreateTaskRequest::new(guild, user, "Seeded task")
        .with_description("created by scenario setup")
        .with_executor(executor);
    let task = run_async(world.service.create(request)).wrap_err("seed task")?;
    world.created_numbers.push(task.number().value());
    Ok(())
}
