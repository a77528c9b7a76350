//! End-to-end chat command flows over the in-memory application.

mod test_helpers;

use rstest::{fixture, rstest};
use taskchord::app::App;
use taskchord::discord::{CommandInvocation, CommandReply};
use test_helpers::in_memory_app;

#[fixture]
fn app() -> App {
    in_memory_app()
}

async fn run(app: &App, guild: &str, user: &str, text: &str) -> CommandReply {
    let invocation =
        CommandInvocation::from_text(text, Some(guild), user).expect("command should parse");
    app.commands().handle(&invocation).await
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn tasks_are_numbered_per_guild(app: App) {
    let first = run(&app, "g1", "u1", r#"/create title="Fix bug" description=desc priority=High"#).await;
    let second = run(&app, "g1", "u1", "/create title=Second description=more").await;
    let other_guild = run(&app, "g2", "u1", "/create title=Elsewhere description=x").await;

    assert_eq!(first.content, "Task #1 created.");
    assert_eq!(second.content, "Task #2 created.");
    assert_eq!(other_guild.content, "Task #1 created.");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_changes_only_given_fields(app: App) {
    run(&app, "g1", "u1", "/create title=Original description=keep priority=High").await;

    let reply = run(&app, "g1", "u1", "/update id=1 priority=Low").await;

    assert!(!reply.ephemeral);
    let embed = reply.embeds.first().expect("updated task embed");
    assert_eq!(embed.title, "#1 Original");
    assert_eq!(embed.description.as_deref(), Some("keep"));
    assert_eq!(
        embed.fields.first().map(|field| field.value.as_str()),
        Some("Low")
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn show_lists_only_the_callers_tasks(app: App) {
    run(&app, "g1", "u1", "/create title=Mine description=a").await;
    run(&app, "g1", "u2", "/create title=Theirs description=b").await;
    run(&app, "g1", "u2", "/create title=Assigned description=c executor=<@u1>").await;

    let reply = run(&app, "g1", "u1", "/show").await;

    assert!(reply.ephemeral);
    assert!(reply.content.contains("**#1** Mine"));
    assert!(reply.content.contains("**#3** Assigned"));
    assert!(!reply.content.contains("Theirs"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn strangers_cannot_touch_tasks(app: App) {
    run(&app, "g1", "u1", "/create title=Private description=a").await;

    let update = run(&app, "g1", "u9", "/update id=1 title=Hijacked").await;
    let delete = run(&app, "g1", "u9", "/delete id=1").await;

    assert!(update.ephemeral);
    assert_eq!(update.content, "Task #1 was not found.");
    assert_eq!(delete.content, "Task #1 was not found.");
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn invalid_choices_are_rejected_before_storage(app: App) {
    let reply = run(&app, "g1", "u1", "/create title=x description=y priority=Urgent").await;
    let listing = run(&app, "g1", "u1", "/show").await;

    assert!(reply.ephemeral);
    assert!(reply.content.starts_with("Invalid input: 'Urgent' is not a valid priority"));
    assert!(listing.content.starts_with("You have no tasks"));
}
