//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{info, warn};

use crate::{
    error::ControlError,
    state::{AppState, FieldId},
    tasks::Command,
};
use super::responses::{ApiResponse, EditFieldRequest, HealthResponse, StatusResponse};

type ControlResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Forward a command and wrap the outcome in an ApiResponse
async fn dispatch(state: &AppState, action: &str, command: Command, message: &str) -> ControlResult {
    match state.send(action, command).await {
        Ok(timer) => {
            info!("{} endpoint called - {}", action, message);
            Ok(Json(ApiResponse::ok(message.to_string(), timer)))
        }
        Err(e) => {
            warn!("{} rejected: {}", action, e);
            let status = status_for(&e);
            Err((status, Json(ApiResponse::error(e.to_string(), state.current_snapshot()))))
        }
    }
}

fn status_for(error: &ControlError) -> StatusCode {
    match error {
        ControlError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ControlError::UnknownField(_) => StatusCode::NOT_FOUND,
        ControlError::DriverUnavailable => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Handle PUT /fields/:field - Edit one duration field
pub async fn edit_field_handler(
    State(state): State<Arc<AppState>>,
    Path(field): Path<FieldId>,
    Json(body): Json<EditFieldRequest>,
) -> ControlResult {
    let command = Command::Edit { field, text: body.text };
    dispatch(&state, "edit", command, "Field edit processed").await
}

/// Handle POST /start - Start a countdown from the entered duration
pub async fn start_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    dispatch(&state, "start", Command::Start, "Countdown started").await
}

/// Handle POST /pause - Pause the running countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    dispatch(&state, "pause", Command::Pause, "Countdown paused").await
}

/// Handle POST /resume - Resume a paused countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    dispatch(&state, "resume", Command::Resume, "Countdown resumed").await
}

/// Handle POST /toggle - Press the start/pause button
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    dispatch(&state, "toggle", Command::Toggle, "Start/pause toggled").await
}

/// Handle POST /stop - Stop and reset the timer
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ControlResult {
    dispatch(&state, "stop", Command::Stop, "Countdown stopped").await
}

/// Handle GET /status - Return the current timer snapshot
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.current_snapshot(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
