//! API routes and handlers

mod health;
mod jobs;
mod sync;


use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Synchronous, cache-first
        .route("/summarize", post(sync::summarize))
        .route("/qa", post(sync::qa))
        .route("/rewrite", post(sync::rewrite))
        // Deferred jobs
        .route("/submit/:task_type", post(jobs::submit))
        .route("/status/:job_id", get(jobs::status))
        .route("/result/:job_id", get(jobs::result))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
