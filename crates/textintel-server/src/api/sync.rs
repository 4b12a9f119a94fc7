//! Synchronous task endpoints

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Serialize;
use serde_json::Value;
use textintel_core::domain::{TaskKind, TaskPayload};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub task: &'static str,
    pub cached: bool,
    pub result: String,
}

// Bodies go through the same decoder as job submissions, so a non-object body
// is rejected here too.
async fn dispatch(
    state: &AppState,
    kind: TaskKind,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    let Json(body) = body?;
    let payload = TaskPayload::from_json(kind, body).map_err(textintel_core::Error::from)?;
    let dispatched = state.dispatcher.handle(&payload).await?;
    Ok(Json(TaskResponse {
        task: kind.label(),
        cached: dispatched.cached,
        result: dispatched.result,
    }))
}

pub async fn summarize(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    dispatch(&state, TaskKind::Summarize, body).await
}

pub async fn qa(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    dispatch(&state, TaskKind::Qa, body).await
}

pub async fn rewrite(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<TaskResponse>, ApiError> {
    dispatch(&state, TaskKind::Rewrite, body).await
}
