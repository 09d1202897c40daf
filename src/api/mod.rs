//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers, request and response
//! structures. It is the boundary through which a front end drives units and
//! observes their state.

pub mod handlers;
pub mod requests;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/units", get(list_units_handler))
        .route("/stopwatches", post(create_stopwatch_handler))
        .route("/countdowns", post(create_countdown_handler))
        .route("/units/:id", get(get_unit_handler).delete(delete_unit_handler))
        .route("/positions/:position", delete(delete_at_handler))
        .route("/units/:id/start", post(start_handler))
        .route("/units/:id/pause", post(pause_handler))
        .route("/units/:id/resume", post(resume_handler))
        .route("/units/:id/toggle", post(toggle_handler))
        .route("/units/:id/stop", post(stop_handler))
        .route("/units/:id/name", put(rename_handler))
        .route("/units/:id/duration", put(duration_handler))
        .route("/events", get(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
