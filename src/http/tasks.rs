//! `/api/task` routes.

use super::{ApiError, AppState};
use crate::task::{
    domain::Task,
    services::{CreateTaskRequest, DeleteTaskRequest, ListTasksQuery, UpdateTaskRequest},
};
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

/// Message returned alongside an empty listing.
pub const EMPTY_LIST_MESSAGE: &str = "No tasks found for the provided criteria.";

/// Task as exposed over HTTP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskView {
    task_id_in_guild: u64,
    guild_id: String,
    title: String,
    description: String,
    priority: String,
    user_id: String,
    executor_id: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<&Task> for TaskView {
    fn from(task: &Task) -> Self {
        Self {
            task_id_in_guild: task.number().value(),
            guild_id: task.guild_id().to_string(),
            title: task.title().to_string(),
            description: task.description().as_str().to_owned(),
            priority: task.priority().to_string(),
            user_id: task.author_id().to_string(),
            executor_id: task.executor_id().to_string(),
            created_at: task.created_at(),
            updated_at: task.updated_at(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ListParams {
    guild_id: String,
    user_id: String,
    #[serde(default)]
    task_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateBody {
    guild_id: String,
    user_id: String,
    title: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    executor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct UpdateBody {
    guild_id: String,
    user_id: String,
    #[serde(default)]
    title: Option<String>,
    /// Absent keeps the description; `null` clears it.
    #[serde(default, deserialize_with = "present")]
    description: Option<Option<String>>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    executor_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OwnerParams {
    guild_id: String,
    user_id: String,
}

/// Distinguishes an explicit `null` from an absent field.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(super) async fn list_tasks(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(params) = params?;
    let mut query = ListTasksQuery::new(params.guild_id, params.user_id);
    if let Some(number) = params.task_id {
        query = query.with_number(number);
    }
    let tasks = state.tasks().list(query).await?;
    let views: Vec<TaskView> = tasks.iter().map(TaskView::from).collect();
    if views.is_empty() {
        return Ok(Json(json!({ "tasks": views, "message": EMPTY_LIST_MESSAGE })));
    }
    Ok(Json(json!({ "tasks": views })))
}

pub(super) async fn create_task(
    State(state): State<AppState>,
    body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(body) = body?;
    let mut request = CreateTaskRequest::new(body.guild_id, body.user_id, body.title);
    if let Some(description) = body.description {
        request = request.with_description(description);
    }
    if let Some(priority) = body.priority {
        request = request.with_priority(priority);
    }
    if let Some(executor) = body.executor_id {
        request = request.with_executor(executor);
    }
    let task = state.tasks().create(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "task_id": task.number().value() })),
    ))
}

pub(super) async fn update_task(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Result<Json<UpdateBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(number) = id?;
    let Json(body) = body?;
    let mut request = UpdateTaskRequest::new(body.guild_id, body.user_id, number);
    if let Some(title) = body.title {
        request = request.with_title(title);
    }
    request = match body.description {
        Some(Some(description)) => request.with_description(description),
        Some(None) => request.clear_description(),
        None => request,
    };
    if let Some(priority) = body.priority {
        request = request.with_priority(priority);
    }
    if let Some(executor) = body.executor_id {
        request = request.with_executor(executor);
    }
    let task = state.tasks().update(request).await?;
    Ok(Json(json!({ "updated_task_id": task.number().value() })))
}

pub(super) async fn delete_task(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    params: Result<Query<OwnerParams>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Path(number) = id?;
    let Query(params) = params?;
    let request = DeleteTaskRequest::new(params.guild_id, params.user_id, number);
    let deleted = state.tasks().delete(request).await?;
    Ok(Json(json!({ "deleted_task_id": deleted.value() })))
}

#[cfg(test)]
mod tests {
    use super::UpdateBody;
    use rstest::rstest;

    fn parse(raw: &str) -> UpdateBody {
        serde_json::from_str(raw).expect("body should parse")
    }

    #[rstest]
    fn description_presence_is_tracked() {
        let absent = parse(r#"{"guild_id":"g1","user_id":"u1"}"#);
        let cleared = parse(r#"{"guild_id":"g1","user_id":"u1","description":null}"#);
        let set = parse(r#"{"guild_id":"g1","user_id":"u1","description":"new"}"#);

        assert_eq!(absent.description, None);
        assert_eq!(cleared.description, Some(None));
        assert_eq!(set.description, Some(Some("new".to_owned())));
    }
}
