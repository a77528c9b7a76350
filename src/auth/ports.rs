//! Identity provider port.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Result type for identity provider calls.
pub type IdentityProviderResult<T> = Result<T, IdentityProviderError>;

/// Bearer token returned by the code exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wraps a raw token.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Account data reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Provider account id.
    pub id: String,
    /// Account username.
    pub username: String,
    /// Verified e-mail address, when the scope grants it.
    pub email: Option<String>,
    /// Fully qualified avatar image URL.
    pub avatar_url: Option<String>,
}

/// OAuth2 authorization-code provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Builds the URL the browser is sent to, carrying `state`.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityProviderError::Configuration`] when the configured
    /// endpoint cannot form a valid URL.
    fn authorize_url(&self, state: &str) -> IdentityProviderResult<String>;

    /// Exchanges an authorization code for an access token.
    async fn exchange_code(&self, code: &str) -> IdentityProviderResult<AccessToken>;

    /// Fetches the account the token belongs to.
    async fn fetch_identity(&self, token: &AccessToken)
    -> IdentityProviderResult<ExternalIdentity>;
}

/// Errors returned by identity provider adapters.
#[derive(Debug, Clone, Error)]
pub enum IdentityProviderError {
    /// The adapter configuration cannot produce a valid request.
    #[error("identity provider misconfigured: {0}")]
    Configuration(String),

    /// The provider answered with a non-success status.
    #[error("identity provider rejected {operation} with status {status}")]
    Rejected {
        /// Failed operation.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// Network or decoding failure.
    #[error("identity provider transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl IdentityProviderError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
