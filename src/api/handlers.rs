//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};

use crate::{
    error::CoreError,
    state::{AppState, UnitAction, UnitId, UnitKind, UnitSnapshot},
};
use super::{
    requests::{CreateCountdownRequest, CreateStopwatchRequest, DurationRequest, RenameRequest},
    responses::{ApiError, ApiResponse, HealthResponse, StatusResponse},
};

type ApiResult<T> = Result<Json<T>, ApiError>;

fn log_failure(operation: &str, e: CoreError) -> ApiError {
    if e.is_not_found() {
        warn!("{} failed: {}", operation, e);
    } else {
        error!("{} failed: {}", operation, e);
    }
    ApiError(e)
}

/// Handle GET /units - List every unit in display order
pub async fn list_units_handler(State(state): State<Arc<AppState>>) -> ApiResult<Vec<UnitSnapshot>> {
    state
        .units()
        .map(Json)
        .map_err(|e| log_failure("Listing units", e))
}

/// Handle POST /stopwatches - Create an idle stopwatch
pub async fn create_stopwatch_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateStopwatchRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    let unit = state
        .add_unit(UnitKind::Stopwatch, request.name, 0)
        .map_err(|e| log_failure("Creating stopwatch", e))?;

    info!("Stopwatch {} created", unit.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::applied(format!("{} created", unit.name), unit)),
    ))
}

/// Handle POST /countdowns - Create an idle countdown
pub async fn create_countdown_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCountdownRequest>,
) -> Result<(StatusCode, Json<ApiResponse>), ApiError> {
    let seconds = request.duration.total_seconds();
    let unit = state
        .add_unit(UnitKind::Countdown, request.name, seconds)
        .map_err(|e| log_failure("Creating countdown", e))?;

    info!("Countdown {} created with {}", unit.id, unit.display);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::applied(format!("{} created", unit.name), unit)),
    ))
}

/// Handle GET /units/:id - Return one unit
pub async fn get_unit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<UnitSnapshot> {
    state
        .unit(UnitId::new(id))
        .map(Json)
        .map_err(|e| log_failure("Fetching unit", e))
}

/// Handle DELETE /units/:id - Stop and delete a unit
pub async fn delete_unit_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> ApiResult<ApiResponse> {
    let unit = state
        .remove(UnitId::new(id))
        .map_err(|e| log_failure("Deleting unit", e))?;

    Ok(Json(ApiResponse::removed(format!("{} deleted", unit.name), unit)))
}

/// Handle DELETE /positions/:position - Stop and delete the unit at a list position
pub async fn delete_at_handler(
    State(state): State<Arc<AppState>>,
    Path(position): Path<usize>,
) -> ApiResult<ApiResponse> {
    let unit = state
        .remove_at(position)
        .map_err(|e| log_failure("Deleting unit by position", e))?;

    Ok(Json(ApiResponse::removed(format!("{} deleted", unit.name), unit)))
}

async fn apply_action(state: &AppState, id: u64, action: UnitAction) -> ApiResult<ApiResponse> {
    let (transition, unit) = state
        .apply(UnitId::new(id), action)
        .map_err(|e| log_failure(action.as_str(), e))?;

    Ok(Json(ApiResponse::for_transition(transition, action.as_str(), unit)))
}

/// Handle POST /units/:id/start
pub async fn start_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<ApiResponse> {
    apply_action(&state, id, UnitAction::Start).await
}

/// Handle POST /units/:id/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<ApiResponse> {
    apply_action(&state, id, UnitAction::Pause).await
}

/// Handle POST /units/:id/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<ApiResponse> {
    apply_action(&state, id, UnitAction::Resume).await
}

/// Handle POST /units/:id/toggle
pub async fn toggle_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<ApiResponse> {
    apply_action(&state, id, UnitAction::Toggle).await
}

/// Handle POST /units/:id/stop
pub async fn stop_handler(State(state): State<Arc<AppState>>, Path(id): Path<u64>) -> ApiResult<ApiResponse> {
    apply_action(&state, id, UnitAction::Stop).await
}

/// Handle PUT /units/:id/name - Rename a unit
pub async fn rename_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<RenameRequest>,
) -> ApiResult<ApiResponse> {
    let unit = state
        .rename(UnitId::new(id), request.name)
        .map_err(|e| log_failure("Renaming unit", e))?;

    Ok(Json(ApiResponse::applied(format!("Renamed to {}", unit.name), unit)))
}

/// Handle PUT /units/:id/duration - Configure a countdown that is not in progress
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    Json(request): Json<DurationRequest>,
) -> ApiResult<ApiResponse> {
    let seconds = i64::try_from(request.total_seconds()).unwrap_or(i64::MAX);
    let (transition, unit) = state
        .set_duration(UnitId::new(id), seconds)
        .map_err(|e| log_failure("Setting duration", e))?;

    Ok(Json(ApiResponse::for_transition(transition, "set duration", unit)))
}

/// Handle GET /events - Stream unit change notifications
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.subscribe();

    let events = stream::unfold(receiver, |mut receiver| async move {
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    let sse = match serde_json::to_string(&event) {
                        Ok(data) => Event::default().event(event.name()).data(data),
                        Err(e) => {
                            error!("Failed to encode unit event: {}", e);
                            continue;
                        }
                    };
                    return Some((Ok(sse), receiver));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Event subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /status - Return every unit with server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> ApiResult<StatusResponse> {
    let units = state
        .units()
        .map_err(|e| log_failure("Fetching status", e))?;
    let running = units.iter().filter(|unit| unit.ticking).count();
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        units,
        running,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
