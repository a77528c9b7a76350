//! Login controller.

use super::{ControllerError, ControllerResult, Operation};
use crate::auth::{LoginError, LoginService, ports::IdentityProvider};
use crate::user::{domain::User, ports::UserRepository, services::UserServiceError};
use mockable::Clock;
use std::sync::Arc;
use url::Url;

/// Entry point for the OAuth login routes.
pub struct LoginController<P, R, C>
where
    P: IdentityProvider + ?Sized,
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    service: Arc<LoginService<P, R, C>>,
    frontend_url: Url,
}

impl<P, R, C> Clone for LoginController<P, R, C>
where
    P: IdentityProvider + ?Sized,
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            frontend_url: self.frontend_url.clone(),
        }
    }
}

impl<P, R, C> LoginController<P, R, C>
where
    P: IdentityProvider + ?Sized,
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a controller that redirects to `frontend_url` after login.
    #[must_use]
    pub fn new(service: LoginService<P, R, C>, frontend_url: Url) -> Self {
        Self {
            service: Arc::new(service),
            frontend_url,
        }
    }

    /// Post-login landing page.
    #[must_use]
    pub const fn frontend_url(&self) -> &Url {
        &self.frontend_url
    }

    /// Returns a provider authorization URL with a fresh `state`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Upstream`] when the URL cannot be built.
    pub fn begin(&self) -> ControllerResult<String> {
        self.service.begin().map_err(translate)
    }

    /// Completes a login callback.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Validation`] for a malformed callback,
    /// [`ControllerError::Upstream`] when the provider fails, and
    /// [`ControllerError::Persistence`] when the user cannot be stored.
    pub async fn complete(&self, code: &str, state: &str) -> ControllerResult<User> {
        self.service.complete(code, state).await.map_err(translate)
    }
}

fn translate(err: LoginError) -> ControllerError {
    match err {
        LoginError::MissingCode | LoginError::InvalidState => {
            tracing::debug!(error = %err, "rejected login callback");
            ControllerError::Validation(err.to_string())
        }
        LoginError::Provider(cause) => {
            tracing::error!(error = %cause, "identity provider failed");
            ControllerError::Upstream
        }
        LoginError::User(UserServiceError::Domain(cause)) => {
            tracing::error!(error = %cause, "identity provider returned an unusable profile");
            ControllerError::Upstream
        }
        LoginError::User(UserServiceError::Repository(cause)) => {
            tracing::error!(error = %cause, "user persistence failed");
            ControllerError::Persistence {
                operation: Operation::Login,
            }
        }
    }
}
