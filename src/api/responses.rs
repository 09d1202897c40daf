//! API response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::CoreError,
    state::{Transition, UnitSnapshot},
};

/// API response structure for unit endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub unit: UnitSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, unit: UnitSnapshot) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            unit,
        }
    }

    /// Create a response for an operation that changed the unit
    pub fn applied(message: String, unit: UnitSnapshot) -> Self {
        Self::new("applied".to_string(), message, unit)
    }

    /// Create a response for an operation the unit's state did not allow
    pub fn ignored(message: String, unit: UnitSnapshot) -> Self {
        Self::new("ignored".to_string(), message, unit)
    }

    /// Create a response for a deleted unit
    pub fn removed(message: String, unit: UnitSnapshot) -> Self {
        Self::new("removed".to_string(), message, unit)
    }

    pub fn for_transition(transition: Transition, operation: &str, unit: UnitSnapshot) -> Self {
        match transition {
            Transition::Applied => Self::applied(format!("{} applied to {}", operation, unit.name), unit),
            Transition::Ignored => Self::ignored(
                format!(
                    "{} has no effect while {} is {}",
                    operation,
                    unit.name,
                    unit.run_state.as_str()
                ),
                unit,
            ),
        }
    }
}

/// Status response with every unit in display order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub units: Vec<UnitSnapshot>,
    pub running: usize,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Error body returned for failed requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Core errors rendered as HTTP responses
#[derive(Debug)]
pub struct ApiError(pub CoreError);

impl From<CoreError> for ApiError {
    fn from(error: CoreError) -> Self {
        Self(error)
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        if self.0.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            status: "error".to_string(),
            message: self.0.to_string(),
            timestamp: Utc::now(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}
