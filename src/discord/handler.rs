//! Chat command dispatch.

use super::commands::{self, ApplicationCommand, CommandName, OptionKind};
use super::invocation::{CommandInvocation, user_id_from_mention};
use super::names::DisplayNameCache;
use super::render::{CommandReply, ReplyRenderer, TaskPeople};
use crate::controller::{ControllerError, TaskController};
use crate::task::{
    domain::{Task, TaskNumber},
    ports::TaskRepository,
    services::{CreateTaskRequest, DeleteTaskRequest, ListTasksQuery, UpdateTaskRequest},
};
use mockable::Clock;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reply used when a template cannot be rendered.
const RENDER_FALLBACK: &str = "Something went wrong while preparing the reply.";

enum Failure {
    Controller(ControllerError),
    Render(minijinja::Error),
}

impl From<ControllerError> for Failure {
    fn from(err: ControllerError) -> Self {
        Self::Controller(err)
    }
}

impl From<minijinja::Error> for Failure {
    fn from(err: minijinja::Error) -> Self {
        Self::Render(err)
    }
}

/// Turns chat command invocations into task operations and replies.
///
/// Successful `create`, `update` and `delete` replies are broadcast; `show`
/// replies and every failure are visible to the caller only.
pub struct CommandHandler<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    tasks: TaskController<R, C>,
    names: Arc<DisplayNameCache<C>>,
    renderer: Arc<ReplyRenderer>,
}

impl<R, C> Clone for CommandHandler<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            tasks: self.tasks.clone(),
            names: Arc::clone(&self.names),
            renderer: Arc::clone(&self.renderer),
        }
    }
}

impl<R, C> CommandHandler<R, C>
where
    R: TaskRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a handler.
    #[must_use]
    pub const fn new(
        tasks: TaskController<R, C>,
        names: Arc<DisplayNameCache<C>>,
        renderer: Arc<ReplyRenderer>,
    ) -> Self {
        Self {
            tasks,
            names,
            renderer,
        }
    }

    /// Runs one invocation and returns the reply to send.
    pub async fn handle(&self, invocation: &CommandInvocation) -> CommandReply {
        tracing::debug!(
            command = invocation.command(),
            user_id = invocation.user_id(),
            guild_id = invocation.guild_id(),
            "handling chat command"
        );
        let outcome = match invocation.guild_id() {
            Some(guild_id) => {
                self.remember_names(guild_id, invocation);
                self.dispatch(guild_id, invocation).await
            }
            None => self.renderer.guild_required().map_err(Failure::from),
        };
        match outcome {
            Ok(reply) => reply,
            Err(Failure::Controller(err)) => self.describe(&err),
            Err(Failure::Render(err)) => fallback(&err),
        }
    }

    fn remember_names(&self, guild_id: &str, invocation: &CommandInvocation) {
        if let Some(name) = invocation.user_name() {
            self.names.remember(guild_id, invocation.user_id(), name);
        }
        for (user_id, name) in invocation.resolved_names() {
            self.names.remember(guild_id, user_id, name);
        }
    }

    async fn dispatch(
        &self,
        guild_id: &str,
        invocation: &CommandInvocation,
    ) -> Result<CommandReply, Failure> {
        let checked = CommandName::parse(invocation.command()).and_then(|command| {
            let definition = commands::definition(command);
            definition.validate(invocation.options())?;
            Ok((command, normalize_options(&definition, invocation.options())))
        });
        let (command, options) = match checked {
            Ok(parsed) => parsed,
            Err(err) => return Ok(self.renderer.invalid_input(&err.to_string())?),
        };
        let value = |name: &str| options.get(name).cloned().unwrap_or_default();
        let user_id = invocation.user_id();

        match command {
            CommandName::Create => {
                let request = CreateTaskRequest::new(guild_id, user_id, value("title"))
                    .with_description(value("description"))
                    .with_priority(value("priority"))
                    .with_executor(value("executor"));
                let task = self.tasks.create(request).await?;
                let (author, executor) = self.people(&task);
                Ok(self.renderer.created(
                    &task,
                    TaskPeople {
                        author: &author,
                        executor: &executor,
                    },
                )?)
            }
            CommandName::Show => {
                let id = value("id");
                let query = ListTasksQuery::new(guild_id, user_id).with_number(id.clone());
                let tasks = self.tasks.list(query).await?;
                if tasks.is_empty()
                    && let Ok(number) = TaskNumber::parse(&id)
                {
                    return Err(ControllerError::NotFound { number }.into());
                }
                self.render_list(&tasks)
            }
            CommandName::Update => {
                let request = UpdateTaskRequest::new(guild_id, user_id, value("id"))
                    .with_title(value("title"))
                    .with_description(value("description"))
                    .with_priority(value("priority"))
                    .with_executor(value("executor"));
                let task = self.tasks.update(request).await?;
                let (author, executor) = self.people(&task);
                Ok(self.renderer.updated(
                    &task,
                    TaskPeople {
                        author: &author,
                        executor: &executor,
                    },
                )?)
            }
            CommandName::Delete => {
                let request = DeleteTaskRequest::new(guild_id, user_id, value("id"));
                let number = self.tasks.delete(request).await?;
                Ok(self.renderer.deleted(number.value())?)
            }
        }
    }

    fn people(&self, task: &Task) -> (String, String) {
        let guild_id = task.guild_id().as_str();
        (
            self.names.display(guild_id, task.author_id().as_str()),
            self.names.display(guild_id, task.executor_id().as_str()),
        )
    }

    fn render_list(&self, tasks: &[Task]) -> Result<CommandReply, Failure> {
        let names: Vec<(String, String)> = tasks.iter().map(|task| self.people(task)).collect();
        let rows: Vec<(&Task, TaskPeople<'_>)> = tasks
            .iter()
            .zip(&names)
            .map(|(task, (author, executor))| (task, TaskPeople { author, executor }))
            .collect();
        Ok(self.renderer.task_list(&rows)?)
    }

    fn describe(&self, err: &ControllerError) -> CommandReply {
        let rendered = match err {
            ControllerError::Validation(reason) => self.renderer.invalid_input(reason),
            ControllerError::NotFound { number } => self.renderer.not_found(number.value()),
            ControllerError::Persistence { operation } => self.renderer.failed(operation.verb()),
            ControllerError::Upstream => self.renderer.failed("process"),
        };
        rendered.unwrap_or_else(|render_err| fallback(&render_err))
    }
}

/// Trims values and reduces user mentions to bare ids.
fn normalize_options(
    definition: &ApplicationCommand,
    options: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    options
        .iter()
        .map(|(name, value)| {
            let normalized = match definition.option(name).map(|option| option.kind) {
                Some(OptionKind::User) => user_id_from_mention(value).to_owned(),
                _ => value.clone(),
            };
            (name.clone(), normalized)
        })
        .collect()
}

fn fallback(err: &minijinja::Error) -> CommandReply {
    tracing::error!(error = %err, "failed to render chat reply");
    CommandReply::ephemeral(RENDER_FALLBACK.to_owned())
}

#[cfg(test)]
mod tests {
    use super::CommandHandler;
    use crate::controller::TaskController;
    use crate::discord::{CommandInvocation, DisplayNameCache, ReplyRenderer};
    use crate::task::{
        adapters::memory::InMemoryTaskRepository,
        domain::{GuildId, NewTask, Task, TaskChanges, TaskNumber, UserId},
        ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
        services::TaskService,
    };
    use async_trait::async_trait;
    use chrono::{DateTime, TimeDelta, Utc};
    use mockable::DefaultClock;
    use mockall::mock;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    mock! {
        Repo {}

        #[async_trait]
        impl TaskRepository for Repo {
            async fn create(&self, task: &NewTask) -> TaskRepositoryResult<Task>;
            async fn find(
                &self,
                guild_id: &GuildId,
                number: TaskNumber,
            ) -> TaskRepositoryResult<Option<Task>>;
            async fn list_for_member(
                &self,
                guild_id: &GuildId,
                user: &UserId,
                number: Option<TaskNumber>,
            ) -> TaskRepositoryResult<Vec<Task>>;
            async fn update_for_member(
                &self,
                guild_id: &GuildId,
                number: TaskNumber,
                caller: &UserId,
                changes: &TaskChanges,
                updated_at: DateTime<Utc>,
            ) -> TaskRepositoryResult<Task>;
            async fn delete_authored(
                &self,
                guild_id: &GuildId,
                number: TaskNumber,
                author: &UserId,
            ) -> TaskRepositoryResult<()>;
        }
    }

    fn handler_over<R: TaskRepository>(repository: R) -> CommandHandler<R, DefaultClock> {
        let clock = Arc::new(DefaultClock);
        CommandHandler::new(
            TaskController::new(TaskService::new(Arc::new(repository), Arc::clone(&clock))),
            Arc::new(DisplayNameCache::new(TimeDelta::minutes(15), clock)),
            Arc::new(ReplyRenderer::new().expect("templates should compile")),
        )
    }

    #[fixture]
    fn handler() -> CommandHandler<InMemoryTaskRepository, DefaultClock> {
        handler_over(InMemoryTaskRepository::new())
    }

    fn run(raw: &str, user: &str) -> CommandInvocation {
        CommandInvocation::from_text(raw, Some("g1"), user).expect("command should parse")
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn create_is_broadcast_and_names_come_from_invocation(
        handler: CommandHandler<InMemoryTaskRepository, DefaultClock>,
    ) {
        let invocation = run(
            r#"/create title="Fix bug" description=desc executor=<@!u2>"#,
            "u1",
        )
        .with_user_name("Alice")
        .with_resolved_name("u2", "Bob");

        let reply = handler.handle(&invocation).await;

        assert!(!reply.ephemeral, "create should be broadcast: {reply:?}");
        assert_eq!(reply.content, "Task #1 created.");
        let embed = reply.embeds.first().expect("task embed");
        let values: Vec<&str> = embed.fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, vec!["Medium", "Alice", "Bob"]);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn show_is_ephemeral_and_unknown_names_are_mentions(
        handler: CommandHandler<InMemoryTaskRepository, DefaultClock>,
    ) {
        handler
            .handle(&run("/create title=One description=a", "u1"))
            .await;
        handler
            .handle(&run("/create title=Two description=b executor=u3", "u1"))
            .await;

        let single = handler.handle(&run("/show id=#2", "u3")).await;
        assert!(single.ephemeral);
        let embed = single.embeds.first().expect("task embed");
        assert_eq!(embed.title, "#2 Two");
        assert!(embed.fields.iter().any(|f| f.value == "<@u1>"));

        let all = handler.handle(&run("/show", "u1")).await;
        assert!(all.ephemeral);
        assert!(all.content.contains("**#1** One"));
        assert!(all.content.contains("**#2** Two"));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn missing_guild_is_rejected_privately(
        handler: CommandHandler<InMemoryTaskRepository, DefaultClock>,
    ) {
        let invocation = CommandInvocation::new("show", "u1");

        let reply = handler.handle(&invocation).await;

        assert!(reply.ephemeral);
        assert_eq!(
            reply.content,
            "Task commands can only be used inside a server."
        );
    }

    #[rstest]
    #[case(
        "/create title=x",
        "Invalid input: missing required option 'description' for '/create'"
    )]
    #[case(
        "/update id=abc title=x",
        "Invalid input: invalid task number 'abc', expected a positive integer"
    )]
    #[case("/delete id=9", "Task #9 was not found.")]
    #[case("/show id=4", "Task #4 was not found.")]
    #[case("/archive id=1", "Invalid input: unknown command '/archive'")]
    #[tokio::test(flavor = "multi_thread")]
    async fn failures_are_private_and_worded_for_users(
        handler: CommandHandler<InMemoryTaskRepository, DefaultClock>,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        let reply = handler.handle(&run(raw, "u1")).await;

        assert!(reply.ephemeral);
        assert_eq!(reply.content, expected);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn only_the_author_may_delete(
        handler: CommandHandler<InMemoryTaskRepository, DefaultClock>,
    ) {
        handler
            .handle(&run("/create title=Mine description=d executor=u2", "u1"))
            .await;

        let by_executor = handler.handle(&run("/delete id=1", "u2")).await;
        let by_author = handler.handle(&run("/delete id=1", "u1")).await;

        assert_eq!(by_executor.content, "Task #1 was not found.");
        assert!(!by_author.ephemeral);
        assert_eq!(by_author.content, "Task #1 deleted.");
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn storage_failures_use_generic_wording() {
        let mut repository = MockRepo::new();
        repository.expect_create().returning(|_| {
            Err(TaskRepositoryError::persistence(std::io::Error::other(
                "connection reset",
            )))
        });
        let handler = handler_over(repository);

        let reply = handler
            .handle(&run("/create title=x description=y", "u1"))
            .await;

        assert!(reply.ephemeral);
        assert_eq!(
            reply.content,
            "Failed to create task. Please try again later."
        );
    }
}
