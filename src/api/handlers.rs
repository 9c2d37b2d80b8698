//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, warn};

use crate::{orchestrator::TimerOrchestrator, state::AppState};
use super::responses::{
    ApiResponse, BreathingRequest, HealthResponse, MessageRequest, NewSessionRequest,
    StatusResponse,
};

type ApiResult = Result<Json<ApiResponse>, StatusCode>;

/// Apply a phase transition and describe the outcome
fn transition<F>(state: &AppState, action: &str, f: F) -> ApiResult
where
    F: FnOnce(&TimerOrchestrator) -> bool,
{
    let outcome = state
        .with_timer(action, |timer| (f(timer), timer.snapshot()))
        .map_err(|e| {
            error!("Failed to {} timer: {}", action, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(match outcome {
        (true, snapshot) => ApiResponse::applied(format!("Timer {}", action), snapshot),
        (false, snapshot) => {
            let message = format!("Cannot {} while {}", action, snapshot.countdown.phase);
            ApiResponse::unchanged(message, snapshot)
        }
    }))
}

/// Apply an update that always succeeds
fn update<F>(state: &AppState, action: &str, message: String, f: F) -> ApiResult
where
    F: FnOnce(&mut TimerOrchestrator),
{
    let snapshot = state
        .with_timer(action, |timer| {
            f(timer);
            timer.snapshot()
        })
        .map_err(|e| {
            error!("Failed to apply {}: {}", action, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ApiResponse::applied(message, snapshot)))
}

/// Handle POST /timer - Replace the session with a new duration
pub async fn new_session_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewSessionRequest>,
) -> ApiResult {
    let outcome = state
        .with_timer("new-session", |timer| {
            timer
                .select_duration(request.duration_seconds, request.exercise_id)
                .map(|()| timer.snapshot())
        })
        .map_err(|e| {
            error!("Failed to create timer session: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    match outcome {
        Ok(snapshot) => Ok(Json(ApiResponse::applied(
            format!("New {}s session", snapshot.countdown.target_duration_seconds),
            snapshot,
        ))),
        Err(e) => {
            warn!("Rejected timer session: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
    }
}

/// Handle POST /timer/start
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    transition(&state, "start", TimerOrchestrator::start)
}

/// Handle POST /timer/pause
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    transition(&state, "pause", TimerOrchestrator::pause)
}

/// Handle POST /timer/resume
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    transition(&state, "resume", TimerOrchestrator::resume)
}

/// Handle POST /timer/stop - Early stop, records the partial hold
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    transition(&state, "stop", TimerOrchestrator::stop)
}

/// Handle POST /timer/reset
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    update(&state, "reset", "Timer reset".to_string(), |timer| timer.reset())
}

/// Handle POST /timer/skip - Abandon the attempt without recording it
pub async fn skip_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    transition(&state, "skip", TimerOrchestrator::skip)
}

/// Handle POST /breathing - Turn breathing guidance on or off
pub async fn breathing_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BreathingRequest>,
) -> ApiResult {
    let message = format!(
        "Breathing guidance {}",
        if request.enabled { "enabled" } else { "disabled" }
    );
    update(&state, "breathing", message, |timer| {
        timer.set_breathing_enabled(request.enabled)
    })
}

/// Handle POST /coaching - Supply or clear the coaching message
pub async fn coaching_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> ApiResult {
    update(&state, "coaching", "Coaching message updated".to_string(), |timer| {
        timer.set_coaching_message(request.message)
    })
}

/// Handle POST /tips - Supply or clear the timer tip
pub async fn tips_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> ApiResult {
    update(&state, "tips", "Timer tip updated".to_string(), |timer| {
        timer.set_tip_message(request.message)
    })
}

/// Handle POST /sound/toggle
pub async fn sound_toggle_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let snapshot = state
        .with_timer("sound-toggle", |timer| {
            timer.toggle_sound();
            timer.snapshot()
        })
        .map_err(|e| {
            error!("Failed to toggle sound: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    let message = format!(
        "Sound {}",
        if snapshot.sound_enabled { "enabled" } else { "disabled" }
    );
    Ok(Json(ApiResponse::applied(message, snapshot)))
}

/// Handle GET /status - Return the current timer view
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer state: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /timer/events - Stream countdown updates as Server-Sent Events
///
/// The stream ends when the session is replaced; clients reconnect.
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, StatusCode> {
    let mut rx = state.subscribe().map_err(|e| {
        error!("Failed to subscribe to timer: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    rx.mark_changed();

    let events = stream::unfold(rx, |mut rx| async move {
        rx.changed().await.ok()?;
        let countdown = *rx.borrow_and_update();
        let event = Event::default()
            .event(countdown.phase.as_str())
            .json_data(countdown)
            .ok()?;
        Some((Ok(event), rx))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
