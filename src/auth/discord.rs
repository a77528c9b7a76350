//! Discord OAuth2 adapter.

use crate::auth::ports::{
    AccessToken, ExternalIdentity, IdentityProvider, IdentityProviderError,
    IdentityProviderResult,
};
use crate::config::{OAuthConfig, api_endpoint};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

/// Scopes requested during login.
pub const SCOPES: &str = "identify email";

/// Base URL of Discord's image CDN.
pub const CDN_BASE: &str = "https://cdn.discordapp.com";

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    #[serde(default)]
    global_name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    avatar: Option<String>,
}

impl DiscordUser {
    fn into_identity(self) -> ExternalIdentity {
        let avatar_url = self.avatar.as_deref().map(|hash| avatar_url(&self.id, hash));
        let username = self
            .global_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(self.username);
        ExternalIdentity {
            id: self.id,
            username,
            email: self.email,
            avatar_url,
        }
    }
}

/// Builds the CDN URL for a user's avatar hash.
///
/// Animated avatars (hash prefixed with `a_`) are served as GIF.
#[must_use]
pub fn avatar_url(user_id: &str, hash: &str) -> String {
    let extension = if hash.starts_with("a_") { "gif" } else { "png" };
    format!("{CDN_BASE}/avatars/{user_id}/{hash}.{extension}")
}

/// Discord implementation of [`IdentityProvider`].
#[derive(Debug, Clone)]
pub struct DiscordOAuthClient {
    client: Client,
    config: OAuthConfig,
}

impl DiscordOAuthClient {
    /// Creates a client for the given OAuth settings.
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Creates a client that reuses an existing HTTP connection pool.
    #[must_use]
    pub const fn with_client(client: Client, config: OAuthConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl IdentityProvider for DiscordOAuthClient {
    fn authorize_url(&self, state: &str) -> IdentityProviderResult<String> {
        let endpoint = api_endpoint(&self.config.api_base, "oauth2/authorize");
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("client_id", self.config.client_id.as_str()),
                ("redirect_uri", self.config.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", SCOPES),
                ("state", state),
                ("prompt", "consent"),
            ],
        )
        .map_err(|err| IdentityProviderError::Configuration(err.to_string()))?;
        Ok(url.into())
    }

    async fn exchange_code(&self, code: &str) -> IdentityProviderResult<AccessToken> {
        let endpoint = api_endpoint(&self.config.api_base, "oauth2/token");
        let form = [
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_url.as_str()),
        ];
        let response = self
            .client
            .post(endpoint)
            .form(&form)
            .send()
            .await
            .map_err(IdentityProviderError::transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "discord token exchange rejected");
            return Err(IdentityProviderError::Rejected {
                operation: "token exchange",
                status: status.as_u16(),
            });
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(IdentityProviderError::transport)?;
        Ok(AccessToken::new(token.access_token))
    }

    async fn fetch_identity(
        &self,
        token: &AccessToken,
    ) -> IdentityProviderResult<ExternalIdentity> {
        let endpoint = api_endpoint(&self.config.api_base, "users/@me");
        let response = self
            .client
            .get(endpoint)
            .bearer_auth(token.secret())
            .send()
            .await
            .map_err(IdentityProviderError::transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "discord identity lookup rejected");
            return Err(IdentityProviderError::Rejected {
                operation: "identity lookup",
                status: status.as_u16(),
            });
        }

        let user: DiscordUser = response
            .json()
            .await
            .map_err(IdentityProviderError::transport)?;
        Ok(user.into_identity())
    }
}
