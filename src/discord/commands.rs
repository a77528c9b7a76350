//! Application command definitions registered with Discord.
//!
//! The same definitions validate text invocations, so a command typed as
//! `/create title=...` is checked against exactly what Discord would enforce.

use super::CommandError;
use crate::task::domain::Priority;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Commands understood by the bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandName {
    /// `/create`
    Create,
    /// `/show`
    Show,
    /// `/update`
    Update,
    /// `/delete`
    Delete,
}

impl CommandName {
    /// All commands in registration order.
    pub const ALL: [Self; 4] = [Self::Create, Self::Show, Self::Update, Self::Delete];

    /// Returns the command name as registered.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Show => "show",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Looks up a command by its registered name.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownCommand`] for any other name.
    pub fn parse(name: &str) -> Result<Self, CommandError> {
        Self::ALL
            .into_iter()
            .find(|command| command.as_str().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| CommandError::UnknownCommand(name.to_owned()))
    }
}

impl fmt::Display for CommandName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Discord application command option type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Free text.
    String = 3,
    /// A guild member; the value is the user id.
    User = 6,
}

/// Discord application command type; only chat-input commands are used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// Slash command typed in the chat box.
    ChatInput = 1,
}

impl Serialize for OptionKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl Serialize for CommandKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A fixed value offered for an option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionChoice {
    /// Label shown to the user.
    pub name: String,
    /// Value sent back on invocation.
    pub value: String,
}

/// One option of an application command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandOption {
    /// Option type.
    #[serde(rename = "type")]
    pub kind: OptionKind,
    /// Option name.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Whether Discord requires the option.
    pub required: bool,
    /// Allowed values, if restricted.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<OptionChoice>,
}

impl CommandOption {
    fn new(kind: OptionKind, name: &str, description: &str, required: bool) -> Self {
        Self {
            kind,
            name: name.to_owned(),
            description: description.to_owned(),
            required,
            choices: Vec::new(),
        }
    }

    fn priority(required: bool) -> Self {
        let mut option =
            Self::new(OptionKind::String, "priority", "Priority of the task", required);
        option.choices = Priority::ALL
            .iter()
            .map(|priority| OptionChoice {
                name: priority.as_str().to_owned(),
                value: priority.as_str().to_owned(),
            })
            .collect();
        option
    }

    fn check_choice(&self, value: &str) -> Result<(), CommandError> {
        if self.choices.is_empty()
            || value.trim().is_empty()
            || self
                .choices
                .iter()
                .any(|choice| choice.value.eq_ignore_ascii_case(value.trim()))
        {
            return Ok(());
        }
        let choices = self
            .choices
            .iter()
            .map(|choice| choice.value.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Err(CommandError::InvalidChoice {
            option: self.name.clone(),
            value: value.to_owned(),
            choices,
        })
    }
}

/// An application command as sent to Discord's bulk-overwrite endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationCommand {
    /// Command name.
    pub name: String,
    /// Help text.
    pub description: String,
    /// Command type.
    #[serde(rename = "type")]
    pub kind: CommandKind,
    /// Options in display order.
    pub options: Vec<CommandOption>,
}

impl ApplicationCommand {
    /// Checks raw options against this definition.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] for unknown options, missing required
    /// options, or values outside the declared choices.
    pub fn validate(&self, provided: &BTreeMap<String, String>) -> Result<(), CommandError> {
        for (key, value) in provided {
            let option = self
                .options
                .iter()
                .find(|option| option.name == *key)
                .ok_or_else(|| CommandError::UnknownOption {
                    command: self.name.clone(),
                    option: key.clone(),
                })?;
            option.check_choice(value)?;
        }
        if let Some(missing) = self
            .options
            .iter()
            .find(|option| option.required && !provided.contains_key(&option.name))
        {
            return Err(CommandError::MissingOption {
                command: self.name.clone(),
                option: missing.name.clone(),
            });
        }
        Ok(())
    }

    /// Returns the definition of `option`, if declared.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&CommandOption> {
        self.options.iter().find(|option| option.name == name)
    }
}

/// Returns the definition of one command.
#[must_use]
pub fn definition(command: CommandName) -> ApplicationCommand {
    let (description, options) = match command {
        CommandName::Create => (
            "Create a new task",
            vec![
                CommandOption::new(OptionKind::String, "title", "Title of the task", true),
                CommandOption::new(
                    OptionKind::String,
                    "description",
                    "Description of the task",
                    true,
                ),
                CommandOption::priority(false),
                CommandOption::new(OptionKind::User, "executor", "Executor of the task", false),
            ],
        ),
        CommandName::Show => (
            "Show your tasks",
            vec![CommandOption::new(
                OptionKind::String,
                "id",
                "Number of the task",
                false,
            )],
        ),
        CommandName::Update => (
            "Update one of your tasks",
            vec![
                CommandOption::new(OptionKind::String, "id", "Number of the task", true),
                CommandOption::new(OptionKind::String, "title", "Title of the task", false),
                CommandOption::new(
                    OptionKind::String,
                    "description",
                    "Description of the task",
                    false,
                ),
                CommandOption::priority(false),
                CommandOption::new(OptionKind::User, "executor", "Executor of the task", false),
            ],
        ),
        CommandName::Delete => (
            "Delete a task you created",
            vec![CommandOption::new(
                OptionKind::String,
                "id",
                "Number of the task",
                true,
            )],
        ),
    };
    ApplicationCommand {
        name: command.as_str().to_owned(),
        description: description.to_owned(),
        kind: CommandKind::ChatInput,
        options,
    }
}

/// Returns every command definition in registration order.
#[must_use]
pub fn task_commands() -> Vec<ApplicationCommand> {
    CommandName::ALL.into_iter().map(definition).collect()
}
