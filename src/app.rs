//! Composition root.
//!
//! Wires repositories, services, controllers and adapters together for one
//! storage backend. Every surface shares the same controllers, so the chat
//! and HTTP paths see the same tasks.

use crate::auth::{LoginService, discord::DiscordOAuthClient, ports::IdentityProvider};
use crate::config::{AppConfig, ConfigError};
use crate::controller::{LoginController, TaskController};
use crate::discord::{CommandHandler, DisplayNameCache, ReplyRenderer};
use crate::http::{self, AppState};
use crate::postgres::PgPool;
use crate::task::{
    adapters::{memory::InMemoryTaskRepository, postgres::PostgresTaskRepository},
    ports::TaskRepository,
    services::TaskService,
};
use crate::user::{
    adapters::{memory::InMemoryUserRepository, postgres::PostgresUserRepository},
    ports::UserRepository,
    services::UserService,
};
use mockable::DefaultClock;
use std::sync::Arc;
use thiserror::Error;

/// Task controller over any repository.
pub type SharedTaskController = TaskController<dyn TaskRepository, DefaultClock>;

/// Login controller over any provider and user repository.
pub type SharedLoginController =
    LoginController<dyn IdentityProvider, dyn UserRepository, DefaultClock>;

/// Chat command handler over any task repository.
pub type SharedCommandHandler = CommandHandler<dyn TaskRepository, DefaultClock>;

/// Where tasks and users are stored.
#[derive(Clone)]
pub enum Storage {
    /// Process-local maps; data is lost on exit.
    InMemory,
    /// `PostgreSQL` through a Diesel connection pool.
    Postgres(PgPool),
}

/// Errors raised while assembling the application.
#[derive(Debug, Error)]
pub enum AppError {
    /// Reply templates failed to compile.
    #[error("failed to compile reply templates: {0}")]
    Templates(#[from] minijinja::Error),
}

/// Fully wired application.
pub struct App {
    tasks: SharedTaskController,
    commands: SharedCommandHandler,
    login: Option<SharedLoginController>,
}

impl App {
    /// Builds the application for `storage`.
    ///
    /// Login is enabled only when the OAuth settings are complete; otherwise
    /// the login routes answer 503.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when a component cannot be constructed.
    pub fn build(config: &AppConfig, storage: Storage) -> Result<Self, AppError> {
        let clock = Arc::new(DefaultClock);
        let (task_repository, user_repository): (Arc<dyn TaskRepository>, Arc<dyn UserRepository>) =
            match storage {
                Storage::InMemory => (
                    Arc::new(InMemoryTaskRepository::new()),
                    Arc::new(InMemoryUserRepository::new()),
                ),
                Storage::Postgres(pool) => (
                    Arc::new(PostgresTaskRepository::new(pool.clone())),
                    Arc::new(PostgresUserRepository::new(pool)),
                ),
            };

        let tasks = TaskController::new(TaskService::new(task_repository, Arc::clone(&clock)));
        let names = Arc::new(DisplayNameCache::new(
            config.name_cache_ttl(),
            Arc::clone(&clock),
        ));
        let commands = CommandHandler::new(tasks.clone(), names, Arc::new(ReplyRenderer::new()?));

        let login = match config.oauth() {
            Ok(oauth) => {
                let frontend_url = oauth.frontend_url.clone();
                let provider: Arc<dyn IdentityProvider> = Arc::new(DiscordOAuthClient::new(oauth));
                let users = UserService::new(user_repository, Arc::clone(&clock));
                Some(LoginController::new(
                    LoginService::new(provider, users, clock),
                    frontend_url,
                ))
            }
            Err(ConfigError::Missing(setting)) => {
                tracing::warn!(setting, "login disabled: OAuth settings incomplete");
                None
            }
        };

        Ok(Self {
            tasks,
            commands,
            login,
        })
    }

    /// Task controller shared by every surface.
    #[must_use]
    pub const fn tasks(&self) -> &SharedTaskController {
        &self.tasks
    }

    /// Chat command handler.
    #[must_use]
    pub const fn commands(&self) -> &SharedCommandHandler {
        &self.commands
    }

    /// HTTP router for the REST API and login routes.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        http::router(AppState::new(self.tasks.clone(), self.login.clone()))
    }
}
