//! Application command registration through Discord's REST API.
//!
//! Registration uses the bulk-overwrite endpoint, so running it twice is
//! harmless and clearing is an overwrite with an empty list.

use super::commands::{ApplicationCommand, task_commands};
use crate::config::{BotConfig, api_endpoint};
use reqwest::Client;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Where commands are registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandScope {
    /// Every guild the application is installed in.
    Global,
    /// A single guild; changes apply immediately.
    Guild(String),
}

impl fmt::Display for CommandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Guild(guild_id) => write!(f, "guild {guild_id}"),
        }
    }
}

/// Errors raised while registering commands.
#[derive(Debug, Clone, Error)]
pub enum RegistrationError {
    /// Discord answered with a non-success status.
    #[error("discord rejected command registration with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The request could not be sent or the response not read.
    #[error("command registration request failed: {0}")]
    Transport(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for RegistrationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(Arc::new(err))
    }
}

/// Registers and removes the bot's application commands.
#[derive(Debug, Clone)]
pub struct CommandRegistrar {
    client: Client,
    config: BotConfig,
}

impl CommandRegistrar {
    /// Creates a registrar for the given bot settings.
    #[must_use]
    pub fn new(config: BotConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a registrar that reuses an existing HTTP connection pool.
    #[must_use]
    pub const fn with_client(client: Client, config: BotConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self, scope: &CommandScope) -> String {
        let application_id = &self.config.application_id;
        let path = match scope {
            CommandScope::Global => format!("applications/{application_id}/commands"),
            CommandScope::Guild(guild_id) => {
                format!("applications/{application_id}/guilds/{guild_id}/commands")
            }
        };
        api_endpoint(&self.config.api_base, &path)
    }

    /// Replaces the commands in `scope` with the task commands.
    ///
    /// Returns the number of commands Discord reports as registered.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the request fails or is rejected.
    pub async fn register(&self, scope: &CommandScope) -> Result<usize, RegistrationError> {
        let count = self.overwrite(scope, &task_commands()).await?;
        tracing::info!(%scope, count, "registered application commands");
        Ok(count)
    }

    /// Removes every command in `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] when the request fails or is rejected.
    pub async fn clear(&self, scope: &CommandScope) -> Result<(), RegistrationError> {
        self.overwrite(scope, &[]).await?;
        tracing::info!(%scope, "cleared application commands");
        Ok(())
    }

    async fn overwrite(
        &self,
        scope: &CommandScope,
        commands: &[ApplicationCommand],
    ) -> Result<usize, RegistrationError> {
        let response = self
            .client
            .put(self.endpoint(scope))
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.config.token),
            )
            .json(commands)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%scope, status = status.as_u16(), "command registration rejected");
            return Err(RegistrationError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let registered: Vec<serde_json::Value> = response.json().await?;
        Ok(registered.len())
    }
}
