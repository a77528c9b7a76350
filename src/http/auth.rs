//! `/api/auth/discord` routes.

use super::{ApiError, AppState};
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

const LOGIN_DISABLED: &str = "login is not configured";

#[derive(Debug, Deserialize)]
pub(super) struct CallbackParams {
    #[serde(default)]
    code: String,
    #[serde(default)]
    state: String,
    #[serde(default)]
    error: Option<String>,
}

pub(super) async fn begin_login(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let login = state
        .login()
        .ok_or_else(|| ApiError::unavailable(LOGIN_DISABLED))?;
    let auth_url = login.begin()?;
    Ok(Json(json!({ "auth_url": auth_url })))
}

pub(super) async fn login_callback(
    State(state): State<AppState>,
    params: Result<Query<CallbackParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let login = state
        .login()
        .ok_or_else(|| ApiError::unavailable(LOGIN_DISABLED))?;
    let Query(params) = params?;
    if let Some(reason) = params.error {
        tracing::debug!(%reason, "login declined at provider");
        return Err(ApiError::bad_request(format!("login was declined: {reason}")));
    }
    let user = login.complete(&params.code, &params.state).await?;
    tracing::info!(user_id = %user.external_id(), "user logged in");
    Ok((
        StatusCode::FOUND,
        [(header::LOCATION, login.frontend_url().to_string())],
    )
        .into_response())
}
