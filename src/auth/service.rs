//! Login orchestration: state issuing, code exchange, user upsert.

use crate::auth::ports::{IdentityProvider, IdentityProviderError};
use crate::cache::TtlCache;
use crate::user::{
    domain::User,
    ports::UserRepository,
    services::{UpsertUserRequest, UserService, UserServiceError},
};
use chrono::TimeDelta;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// How long an issued `state` value stays redeemable.
pub const LOGIN_STATE_TTL_SECS: i64 = 600;

/// Errors raised by the login flow.
#[derive(Debug, Error)]
pub enum LoginError {
    /// The callback carried no authorization code.
    #[error("authorization code is required")]
    MissingCode,

    /// The callback `state` was never issued, already used, or expired.
    #[error("login state is unknown or expired")]
    InvalidState,

    /// The identity provider call failed.
    #[error(transparent)]
    Provider(#[from] IdentityProviderError),

    /// Storing the user failed.
    #[error(transparent)]
    User(#[from] UserServiceError),
}

/// Result type for login operations.
pub type LoginResult<T> = Result<T, LoginError>;

/// OAuth2 authorization-code login service.
pub struct LoginService<P, R, C>
where
    P: IdentityProvider + ?Sized,
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    provider: Arc<P>,
    users: UserService<R, C>,
    clock: Arc<C>,
    pending: TtlCache<String, ()>,
}

impl<P, R, C> LoginService<P, R, C>
where
    P: IdentityProvider + ?Sized,
    R: UserRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a login service.
    #[must_use]
    pub fn new(provider: Arc<P>, users: UserService<R, C>, clock: Arc<C>) -> Self {
        Self {
            provider,
            users,
            clock,
            pending: TtlCache::new(TimeDelta::seconds(LOGIN_STATE_TTL_SECS)),
        }
    }

    /// Issues a fresh `state` and returns the provider authorization URL.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Provider`] when the URL cannot be built.
    pub fn begin(&self) -> LoginResult<String> {
        let state = Uuid::new_v4().simple().to_string();
        let url = self.provider.authorize_url(&state)?;
        self.pending.insert(state, (), self.clock.utc());
        Ok(url)
    }

    /// Completes a login from the provider callback.
    ///
    /// The `state` is consumed whether or not the rest of the flow succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::MissingCode`] or [`LoginError::InvalidState`]
    /// for a malformed callback, [`LoginError::Provider`] when the provider
    /// rejects the code, and [`LoginError::User`] when the upsert fails.
    pub async fn complete(&self, code: &str, state: &str) -> LoginResult<User> {
        if code.trim().is_empty() {
            return Err(LoginError::MissingCode);
        }
        self.pending
            .take(&state.to_owned(), self.clock.utc())
            .ok_or(LoginError::InvalidState)?;

        let token = self.provider.exchange_code(code).await?;
        let identity = self.provider.fetch_identity(&token).await?;
        tracing::info!(user_id = %identity.id, "login completed");

        let request = UpsertUserRequest::new(identity.id, identity.username)
            .with_email(identity.email)
            .with_avatar_url(identity.avatar_url);
        Ok(self.users.upsert(request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::{LoginError, LoginService};
    use crate::auth::ports::{
        AccessToken, ExternalIdentity, IdentityProvider, IdentityProviderError,
        IdentityProviderResult,
    };
    use crate::user::{adapters::memory::InMemoryUserRepository, services::UserService};
    use async_trait::async_trait;
    use mockable::DefaultClock;
    use mockall::mock;
    use rstest::{fixture, rstest};
    use std::sync::Arc;

    mock! {
        Provider {}

        #[async_trait]
        impl IdentityProvider for Provider {
            fn authorize_url(&self, state: &str) -> IdentityProviderResult<String>;
            async fn exchange_code(&self, code: &str) -> IdentityProviderResult<AccessToken>;
            async fn fetch_identity(
                &self,
                token: &AccessToken,
            ) -> IdentityProviderResult<ExternalIdentity>;
        }
    }

    type TestLogin = LoginService<MockProvider, InMemoryUserRepository, DefaultClock>;

    fn login_with(provider: MockProvider) -> (TestLogin, UserService<InMemoryUserRepository, DefaultClock>) {
        let clock = Arc::new(DefaultClock);
        let users = UserService::new(Arc::new(InMemoryUserRepository::new()), Arc::clone(&clock));
        (
            LoginService::new(Arc::new(provider), users.clone(), clock),
            users,
        )
    }

    #[fixture]
    fn happy_provider() -> MockProvider {
        let mut provider = MockProvider::new();
        provider
            .expect_authorize_url()
            .returning(|state| Ok(format!("https://auth.example/authorize?state={state}")));
        provider
            .expect_exchange_code()
            .returning(|_| Ok(AccessToken::new("token")));
        provider.expect_fetch_identity().returning(|_| {
            Ok(ExternalIdentity {
                id: "42".to_owned(),
                username: "alice".to_owned(),
                email: Some("alice@example.com".to_owned()),
                avatar_url: None,
            })
        });
        provider
    }

    fn issued_state(url: &str) -> String {
        url.rsplit("state=").next().unwrap_or_default().to_owned()
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn callback_with_issued_state_upserts_user(happy_provider: MockProvider) {
        let (login, users) = login_with(happy_provider);
        let url = login.begin().expect("url should build");

        let user = login
            .complete("code", &issued_state(&url))
            .await
            .expect("login should succeed");

        assert_eq!(user.profile().username(), "alice");
        let stored = users.find("42").await.expect("lookup should succeed");
        assert_eq!(stored, Some(user));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn state_cannot_be_replayed(happy_provider: MockProvider) {
        let (login, _) = login_with(happy_provider);
        let state = issued_state(&login.begin().expect("url should build"));
        login
            .complete("code", &state)
            .await
            .expect("first login should succeed");

        let replay = login.complete("code", &state).await;
        assert!(matches!(replay, Err(LoginError::InvalidState)));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn unknown_state_and_missing_code_are_rejected(happy_provider: MockProvider) {
        let (login, _) = login_with(happy_provider);

        assert!(matches!(
            login.complete("code", "forged").await,
            Err(LoginError::InvalidState)
        ));
        assert!(matches!(
            login.complete(" ", "forged").await,
            Err(LoginError::MissingCode)
        ));
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn provider_rejection_is_surfaced() {
        let mut provider = MockProvider::new();
        provider
            .expect_authorize_url()
            .returning(|state| Ok(format!("https://auth.example/authorize?state={state}")));
        provider.expect_exchange_code().returning(|_| {
            Err(IdentityProviderError::Rejected {
                operation: "token exchange",
                status: 400,
            })
        });
        let (login, _) = login_with(provider);
        let state = issued_state(&login.begin().expect("url should build"));

        let result = login.complete("bad-code", &state).await;

        assert!(matches!(result, Err(LoginError::Provider(_))));
    }
}
