//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::orchestrator::TimerSnapshot;

/// Response for timer action endpoints
#[derive(Debug, Clone, Serialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerSnapshot,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String, timer: TimerSnapshot) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// The action changed the timer
    pub fn applied(message: String, timer: TimerSnapshot) -> Self {
        Self::new("applied", message, timer)
    }

    /// The action was not valid in the current phase and changed nothing
    pub fn unchanged(message: String, timer: TimerSnapshot) -> Self {
        Self::new("unchanged", message, timer)
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerSnapshot,
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

/// Body of `POST /timer`
#[derive(Debug, Clone, Deserialize)]
pub struct NewSessionRequest {
    pub duration_seconds: u64,
    pub exercise_id: Option<String>,
}

/// Body of `POST /breathing`
#[derive(Debug, Clone, Deserialize)]
pub struct BreathingRequest {
    pub enabled: bool,
}

/// Body of `POST /coaching` and `POST /tips`; `null` clears the message
#[derive(Debug, Clone, Deserialize)]
pub struct MessageRequest {
    pub message: Option<String>,
}
