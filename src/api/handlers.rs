//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use tracing::{error, info, warn};

use crate::{
    config::TimerConfig,
    error::TimerError,
    state::{AppState, Stage},
    utils::window_title,
};
use super::responses::{ApiResponse, HealthResponse, StatusResponse};

pub type HandlerResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Map a timer error onto an HTTP status with a plain-text body
fn reject(e: TimerError) -> (StatusCode, String) {
    match &e {
        TimerError::InvalidConfiguration(_) => {
            warn!("Rejected request: {}", e);
            (StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        TimerError::InvalidStageTarget(_) => {
            warn!("Rejected request: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        TimerError::StateUnavailable(_) => {
            error!("Timer state unavailable: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// Handle POST /toggle - Start or pause the countdown
pub async fn toggle_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    let timer = state.toggle().map_err(reject)?;
    let message = if timer.is_running {
        format!("{} started", timer.stage)
    } else {
        format!("{} paused", timer.stage)
    };
    info!("Toggle endpoint called - {}", message);
    Ok(Json(ApiResponse::new(message, timer)))
}

/// Handle POST /reset - Back to the first work stage
pub async fn reset_handler(State(state): State<Arc<AppState>>) -> HandlerResult<ApiResponse> {
    let timer = state.reset().map_err(reject)?;
    info!("Reset endpoint called");
    Ok(Json(ApiResponse::new("Timer reset".to_string(), timer)))
}

/// Handle POST /skip/:stage - Jump to a stage, paused
pub async fn skip_handler(
    State(state): State<Arc<AppState>>,
    Path(stage_name): Path<String>,
) -> HandlerResult<ApiResponse> {
    let stage: Stage = stage_name.parse().map_err(reject)?;
    let timer = state.skip_to_stage(stage).map_err(reject)?;
    info!("Skip endpoint called - now at {}", stage);
    Ok(Json(ApiResponse::new(format!("Skipped to {}", stage), timer)))
}

/// Handle GET /config - Current durations and cycle count
pub async fn get_config_handler(State(state): State<Arc<AppState>>) -> HandlerResult<TimerConfig> {
    state.get_config().map(Json).map_err(reject)
}

/// Handle PUT /config - Replace durations and cycle count
pub async fn put_config_handler(
    State(state): State<Arc<AppState>>,
    Json(config): Json<TimerConfig>,
) -> HandlerResult<ApiResponse> {
    let timer = state.reconfigure(config).map_err(reject)?;
    let message = if timer.is_running {
        "Configuration saved; applies from the next stage"
    } else {
        "Configuration saved"
    };
    info!("Config endpoint called - {:?}", config);
    Ok(Json(ApiResponse::new(message.to_string(), timer)))
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(State(state): State<Arc<AppState>>) -> HandlerResult<StatusResponse> {
    let timer = state.get_snapshot().map_err(reject)?;
    let config = state.get_config().map_err(reject)?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        display: window_title(&timer),
        timer,
        config,
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
