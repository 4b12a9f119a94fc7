//! Application state shared by every handler

use std::sync::Arc;

use textintel_core::app::{App, Dispatcher, HealthCheck, JobTracker};

/// Cheap to clone: every field is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub tracker: Arc<JobTracker>,
    pub health: Arc<HealthCheck>,
}

impl AppState {
    pub fn new(app: &App) -> Self {
        Self {
            dispatcher: Arc::clone(&app.dispatcher),
            tracker: Arc::clone(&app.tracker),
            health: Arc::clone(&app.health),
        }
    }
}
