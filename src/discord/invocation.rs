//! Chat command invocations as delivered to the handler.

use super::{CommandError, ParsedCommand};
use std::collections::BTreeMap;

/// One chat command call: who ran it, where, and with which options.
///
/// Gateway integrations build invocations with the builder methods; local
/// tooling uses [`CommandInvocation::from_text`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    command: String,
    guild_id: Option<String>,
    user_id: String,
    user_name: Option<String>,
    options: BTreeMap<String, String>,
    resolved_names: BTreeMap<String, String>,
}

impl CommandInvocation {
    /// Starts an invocation of `command` by `user_id` outside any guild.
    #[must_use]
    pub fn new(command: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            guild_id: None,
            user_id: user_id.into(),
            user_name: None,
            options: BTreeMap::new(),
            resolved_names: BTreeMap::new(),
        }
    }

    /// Parses `/command key=value ...` text into an invocation.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError`] when the text is not a well-formed command.
    pub fn from_text(
        raw: &str,
        guild_id: Option<&str>,
        user_id: impl Into<String>,
    ) -> Result<Self, CommandError> {
        let (command, options) = ParsedCommand::parse(raw)?.into_parts();
        let invocation = Self {
            options,
            ..Self::new(command, user_id)
        };
        Ok(match guild_id {
            Some(guild) => invocation.in_guild(guild),
            None => invocation,
        })
    }

    /// Sets the guild the command was issued in.
    #[must_use]
    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }

    /// Adds an option value as typed or selected by the caller.
    #[must_use]
    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Records the caller's display name.
    #[must_use]
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = Some(name.into());
        self
    }

    /// Records the display name of a user referenced by an option.
    #[must_use]
    pub fn with_resolved_name(
        mut self,
        user_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.resolved_names.insert(user_id.into(), name.into());
        self
    }

    /// Command name without the leading slash.
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Guild the command was issued in, if any.
    #[must_use]
    pub fn guild_id(&self) -> Option<&str> {
        self.guild_id.as_deref()
    }

    /// Caller id.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Caller display name, when known.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Raw option values.
    #[must_use]
    pub const fn options(&self) -> &BTreeMap<String, String> {
        &self.options
    }

    /// Returns one option value.
    #[must_use]
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Display names of users referenced by the invocation.
    #[must_use]
    pub const fn resolved_names(&self) -> &BTreeMap<String, String> {
        &self.resolved_names
    }
}

/// Strips Discord mention syntax (`<@id>` or `<@!id>`) from a user value.
#[must_use]
pub fn user_id_from_mention(value: &str) -> &str {
    let trimmed = value.trim();
    trimmed
        .strip_prefix("<@")
        .and_then(|rest| rest.strip_suffix('>'))
        .map_or(trimmed, |id| id.strip_prefix('!').unwrap_or(id))
}
