use axum::{Json, extract::State};
use textintel_core::app::HealthReport;

use crate::state::AppState;

/// Always 200; the body says whether the store answered.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(state.health.check().await)
}
