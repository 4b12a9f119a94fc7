//! Job submission and lookup

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use serde::Serialize;
use serde_json::Value;
use textintel_core::app::JobView;
use textintel_core::domain::{JobStatus, TaskKind, TaskPayload};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub status: JobStatus,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub job_id: String,
    pub status: JobStatus,
}

pub async fn submit(
    State(state): State<AppState>,
    Path(task_type): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let kind: TaskKind = task_type.parse().map_err(textintel_core::Error::from)?;
    let Json(body) = body?;
    let payload = TaskPayload::from_json(kind, body).map_err(textintel_core::Error::from)?;

    let job_id = state.tracker.submit(payload).await?;
    Ok(Json(SubmitResponse {
        job_id: job_id.to_string(),
        status: JobStatus::Queued,
    }))
}

pub async fn status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.tracker.status(&job_id).await?;
    Ok(Json(StatusResponse { job_id, status }))
}

pub async fn result(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<JobView>, ApiError> {
    Ok(Json(state.tracker.result(&job_id).await?))
}
