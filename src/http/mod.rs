//! REST API over axum.
//!
//! Handlers only translate between JSON and controller calls; every rule
//! lives in the services. Errors are answered as `{"error": "..."}`.

mod auth;
mod error;
mod tasks;

pub use error::ApiError;
pub use tasks::{EMPTY_LIST_MESSAGE, TaskView};

use crate::app::{SharedLoginController, SharedTaskController};
use axum::{
    Json, Router,
    routing::{get, post, put},
};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    tasks: SharedTaskController,
    login: Option<SharedLoginController>,
}

impl AppState {
    /// Creates handler state; `login` is `None` when OAuth is not configured.
    #[must_use]
    pub const fn new(tasks: SharedTaskController, login: Option<SharedLoginController>) -> Self {
        Self { tasks, login }
    }

    pub(crate) const fn tasks(&self) -> &SharedTaskController {
        &self.tasks
    }

    pub(crate) const fn login(&self) -> Option<&SharedLoginController> {
        self.login.as_ref()
    }
}

/// Builds the HTTP router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/task", get(tasks::list_tasks).post(tasks::create_task))
        .route(
            "/api/task/{id}",
            put(tasks::update_task).delete(tasks::delete_task),
        )
        .route("/api/auth/discord", post(auth::begin_login))
        .route("/api/auth/discord/callback", get(auth::login_callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}
