//! Reply rendering for chat commands.

use crate::task::domain::Task;
use minijinja::{Environment, context};
use std::fmt;

/// Discord's limit on message content length.
pub const MAX_CONTENT_CHARS: usize = 2000;

/// Discord's limit on embed title length.
pub const MAX_EMBED_TITLE_CHARS: usize = 256;

const TEMPLATES: &[(&str, &str)] = &[
    ("created", "Task #{{ number }} created."),
    ("updated", "Task #{{ number }} updated."),
    ("deleted", "Task #{{ number }} deleted."),
    ("list_header", "Your tasks ({{ count }}):"),
    (
        "list_item",
        "**#{{ number }}** {{ title }} · {{ priority }} · executor {{ executor }}",
    ),
    ("list_overflow", "…and {{ remaining }} more."),
    (
        "empty",
        "You have no tasks in this server. Create one with `/create`.",
    ),
    ("embed_title", "#{{ number }} {{ title }}"),
    ("invalid_input", "Invalid input: {{ reason }}"),
    ("not_found", "Task #{{ number }} was not found."),
    ("failed", "Failed to {{ verb }} task. Please try again later."),
    ("guild_required", "Task commands can only be used inside a server."),
];

/// One `name: value` pair shown in an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field label.
    pub name: String,
    /// Field value.
    pub value: String,
    /// Whether Discord may lay the field out side by side.
    pub inline: bool,
}

/// Rich card describing one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    /// `#<number> <title>`, capped at the embed title limit.
    pub title: String,
    /// Task description; `None` when empty.
    pub description: Option<String>,
    /// Priority, author and executor.
    pub fields: Vec<EmbedField>,
}

/// Reply produced for a chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    /// Message text.
    pub content: String,
    /// Task cards.
    pub embeds: Vec<Embed>,
    /// `true` when only the caller should see the reply.
    pub ephemeral: bool,
}

impl CommandReply {
    /// Plain reply visible only to the caller.
    #[must_use]
    pub const fn ephemeral(content: String) -> Self {
        Self {
            content,
            embeds: Vec::new(),
            ephemeral: true,
        }
    }

    /// Plain reply broadcast to the channel.
    #[must_use]
    pub const fn broadcast(content: String) -> Self {
        Self {
            content,
            embeds: Vec::new(),
            ephemeral: false,
        }
    }

    /// Attaches an embed.
    #[must_use]
    pub fn with_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }
}

impl fmt::Display for CommandReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ephemeral {
            writeln!(f, "(only visible to you)")?;
        }
        if !self.content.is_empty() {
            writeln!(f, "{}", self.content)?;
        }
        for embed in &self.embeds {
            writeln!(f, "┃ {}", embed.title)?;
            if let Some(description) = &embed.description {
                for line in description.lines() {
                    writeln!(f, "┃ {line}")?;
                }
            }
            for field in &embed.fields {
                writeln!(f, "┃ {}: {}", field.name, field.value)?;
            }
        }
        Ok(())
    }
}

/// Names used when rendering a task.
#[derive(Debug, Clone, Copy)]
pub struct TaskPeople<'a> {
    /// Display name of the author.
    pub author: &'a str,
    /// Display name of the executor.
    pub executor: &'a str,
}

/// Renders replies from static `minijinja` templates.
pub struct ReplyRenderer {
    env: Environment<'static>,
}

impl fmt::Debug for ReplyRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyRenderer").finish_non_exhaustive()
    }
}

impl ReplyRenderer {
    /// Compiles the reply templates.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when a template fails to compile.
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for &(name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    fn render(&self, name: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(ctx)
    }

    /// Embed for one task.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn task_embed(
        &self,
        task: &Task,
        people: TaskPeople<'_>,
    ) -> Result<Embed, minijinja::Error> {
        let title = self.render(
            "embed_title",
            context! { number => task.number().value(), title => task.title().as_str() },
        )?;
        let description =
            (!task.description().is_empty()).then(|| task.description().as_str().to_owned());
        Ok(Embed {
            title: truncate_chars(&title, MAX_EMBED_TITLE_CHARS),
            description,
            fields: vec![
                EmbedField {
                    name: "Priority".to_owned(),
                    value: task.priority().to_string(),
                    inline: true,
                },
                EmbedField {
                    name: "Author".to_owned(),
                    value: people.author.to_owned(),
                    inline: true,
                },
                EmbedField {
                    name: "Executor".to_owned(),
                    value: people.executor.to_owned(),
                    inline: true,
                },
            ],
        })
    }

    /// Broadcast reply for a created task.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn created(
        &self,
        task: &Task,
        people: TaskPeople<'_>,
    ) -> Result<CommandReply, minijinja::Error> {
        let content = self.render("created", context! { number => task.number().value() })?;
        Ok(CommandReply::broadcast(content).with_embed(self.task_embed(task, people)?))
    }

    /// Broadcast reply for an updated task.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn updated(
        &self,
        task: &Task,
        people: TaskPeople<'_>,
    ) -> Result<CommandReply, minijinja::Error> {
        let content = self.render("updated", context! { number => task.number().value() })?;
        Ok(CommandReply::broadcast(content).with_embed(self.task_embed(task, people)?))
    }

    /// Broadcast reply for a deleted task.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn deleted(&self, number: u64) -> Result<CommandReply, minijinja::Error> {
        self.render("deleted", context! { number => number })
            .map(CommandReply::broadcast)
    }

    /// Ephemeral reply listing tasks.
    ///
    /// A single task renders as an embed; several render as a compact list
    /// that stops at whole lines before [`MAX_CONTENT_CHARS`].
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn task_list(
        &self,
        tasks: &[(&Task, TaskPeople<'_>)],
    ) -> Result<CommandReply, minijinja::Error> {
        match tasks {
            [] => self.render("empty", context! {}).map(CommandReply::ephemeral),
            [(task, people)] => Ok(CommandReply::ephemeral(String::new())
                .with_embed(self.task_embed(task, *people)?)),
            _ => self.compact_list(tasks).map(CommandReply::ephemeral),
        }
    }

    fn compact_list(&self, tasks: &[(&Task, TaskPeople<'_>)]) -> Result<String, minijinja::Error> {
        let mut content = self.render("list_header", context! { count => tasks.len() })?;
        for (shown, (task, people)) in tasks.iter().enumerate() {
            let line = self.render(
                "list_item",
                context! {
                    number => task.number().value(),
                    title => task.title().as_str(),
                    priority => task.priority().as_str(),
                    executor => people.executor,
                },
            )?;
            let remaining = tasks.len().saturating_sub(shown);
            let overflow = self.render("list_overflow", context! { remaining => remaining })?;
            let needed = content.chars().count() + 1 + line.chars().count();
            let is_last = remaining == 1;
            let reserve = if is_last { 0 } else { overflow.chars().count() + 1 };
            if needed + reserve > MAX_CONTENT_CHARS {
                content.push('\n');
                content.push_str(&overflow);
                return Ok(truncate_chars(&content, MAX_CONTENT_CHARS));
            }
            content.push('\n');
            content.push_str(&line);
        }
        Ok(content)
    }

    /// Ephemeral `Invalid input: <reason>` reply.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn invalid_input(&self, reason: &str) -> Result<CommandReply, minijinja::Error> {
        self.render("invalid_input", context! { reason => reason })
            .map(CommandReply::ephemeral)
    }

    /// Ephemeral not-found reply.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn not_found(&self, number: u64) -> Result<CommandReply, minijinja::Error> {
        self.render("not_found", context! { number => number })
            .map(CommandReply::ephemeral)
    }

    /// Ephemeral storage-failure reply.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn failed(&self, verb: &str) -> Result<CommandReply, minijinja::Error> {
        self.render("failed", context! { verb => verb })
            .map(CommandReply::ephemeral)
    }

    /// Ephemeral rejection for invocations outside a guild.
    ///
    /// # Errors
    ///
    /// Returns [`minijinja::Error`] when rendering fails.
    pub fn guild_required(&self) -> Result<CommandReply, minijinja::Error> {
        self.render("guild_required", context! {})
            .map(CommandReply::ephemeral)
    }
}

/// Keeps at most `max` characters of `text`.
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
