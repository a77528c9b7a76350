//! Runtime configuration parsed once at startup.
//!
//! Every option can be given as a flag or an environment variable; the
//! binary loads a `.env` file first, so local development needs no exports.
//! Collaborators that need secrets ask for a typed sub-configuration, which
//! fails with [`ConfigError`] naming the first missing variable.

use crate::telemetry::LogFormat;
use chrono::TimeDelta;
use std::fmt;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

/// Default Discord REST API base.
pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Errors raised when a required setting is absent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable or flag is not set.
    #[error("missing required setting {0}")]
    Missing(&'static str),
}

/// Application settings shared by every subcommand.
#[derive(Debug, Clone, clap::Args)]
pub struct AppConfig {
    /// `PostgreSQL` connection URL.
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections.
    #[arg(long, env = "DATABASE_POOL_SIZE", default_value_t = 10)]
    pub database_pool_size: u32,

    /// Address the HTTP server binds to.
    #[arg(long, env = "BIND_ADDRESS", default_value = "0.0.0.0:8080")]
    pub bind_address: SocketAddr,

    /// Discord bot token used for command registration.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub discord_bot_token: Option<String>,

    /// Discord application id.
    #[arg(long, env = "DISCORD_APPLICATION_ID")]
    pub discord_application_id: Option<String>,

    /// OAuth2 client id.
    #[arg(long, env = "DISCORD_CLIENT_ID")]
    pub discord_client_id: Option<String>,

    /// OAuth2 client secret.
    #[arg(long, env = "DISCORD_CLIENT_SECRET", hide_env_values = true)]
    pub discord_client_secret: Option<String>,

    /// OAuth2 redirect URL registered with Discord.
    #[arg(long, env = "DISCORD_REDIRECT_URL")]
    pub discord_redirect_url: Option<Url>,

    /// Discord REST API base URL.
    #[arg(long, env = "DISCORD_API_BASE", default_value = DEFAULT_DISCORD_API_BASE)]
    pub discord_api_base: Url,

    /// Where users land after a successful login.
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:3000")]
    pub frontend_url: Url,

    /// Lifetime of cached member display names, in seconds.
    #[arg(long, env = "NAME_CACHE_TTL_SECS", default_value_t = 900)]
    pub name_cache_ttl_secs: u32,

    /// Log output format.
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Settings for the OAuth2 login flow.
#[derive(Clone)]
pub struct OAuthConfig {
    /// OAuth2 client id.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Redirect URL registered with the provider.
    pub redirect_url: Url,
    /// Provider REST API base.
    pub api_base: Url,
    /// Post-login landing page.
    pub frontend_url: Url,
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_url", &self.redirect_url.as_str())
            .field("api_base", &self.api_base.as_str())
            .field("frontend_url", &self.frontend_url.as_str())
            .finish()
    }
}

/// Settings for talking to the Discord bot API.
#[derive(Clone)]
pub struct BotConfig {
    /// Bot token.
    pub token: String,
    /// Application id that owns the commands.
    pub application_id: String,
    /// Discord REST API base.
    pub api_base: Url,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("token", &"<redacted>")
            .field("application_id", &self.application_id)
            .field("api_base", &self.api_base.as_str())
            .finish()
    }
}

fn required<T: Clone>(value: Option<&T>, name: &'static str) -> Result<T, ConfigError> {
    value.cloned().ok_or(ConfigError::Missing(name))
}

impl AppConfig {
    /// Returns the database URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when `DATABASE_URL` is not set.
    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    /// Returns the OAuth2 login settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent variable.
    pub fn oauth(&self) -> Result<OAuthConfig, ConfigError> {
        Ok(OAuthConfig {
            client_id: required(self.discord_client_id.as_ref(), "DISCORD_CLIENT_ID")?,
            client_secret: required(self.discord_client_secret.as_ref(), "DISCORD_CLIENT_SECRET")?,
            redirect_url: required(self.discord_redirect_url.as_ref(), "DISCORD_REDIRECT_URL")?,
            api_base: self.discord_api_base.clone(),
            frontend_url: self.frontend_url.clone(),
        })
    }

    /// Returns the bot API settings.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first absent variable.
    pub fn bot(&self) -> Result<BotConfig, ConfigError> {
        Ok(BotConfig {
            token: required(self.discord_bot_token.as_ref(), "DISCORD_BOT_TOKEN")?,
            application_id: required(
                self.discord_application_id.as_ref(),
                "DISCORD_APPLICATION_ID",
            )?,
            api_base: self.discord_api_base.clone(),
        })
    }

    /// Returns the display-name cache lifetime.
    #[must_use]
    pub fn name_cache_ttl(&self) -> TimeDelta {
        TimeDelta::seconds(i64::from(self.name_cache_ttl_secs))
    }
}

/// Joins `path` onto an API base without dropping the base's last segment.
#[must_use]
pub fn api_endpoint(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
