//! # REST API for Alarm Management
//!
//! Endpoints for creating, listing, deleting, and toggling alarms. These are
//! the only entry points that mutate the store from outside the scheduler
//! loop; all logic lives in the alarm service, the handlers just map results
//! onto status codes.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use log::{error, info};

use crate::AppState;
use shared::{AlarmListResponse, CreateAlarmRequest};

/// Create a new alarm
pub async fn create_alarm(
    State(state): State<AppState>,
    Json(request): Json<CreateAlarmRequest>,
) -> impl IntoResponse {
    info!("POST /api/alarms - request: {:?}", request);

    match state.alarm_service.create_alarm(request).await {
        Ok(alarm) => (StatusCode::CREATED, Json(alarm)).into_response(),
        Err(e) => {
            error!("Failed to create alarm: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string()).into_response()
        }
    }
}

/// List all alarms
pub async fn list_alarms(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/alarms");

    let alarms = state.alarm_service.list_alarms();
    (StatusCode::OK, Json(AlarmListResponse { alarms })).into_response()
}

/// Delete an alarm
pub async fn delete_alarm(
    State(state): State<AppState>,
    Path(alarm_id): Path<String>,
) -> impl IntoResponse {
    info!("DELETE /api/alarms/{}", alarm_id);

    if state.alarm_service.delete_alarm(&alarm_id).await {
        (StatusCode::NO_CONTENT, "").into_response()
    } else {
        (StatusCode::NOT_FOUND, "Alarm not found").into_response()
    }
}

/// Enable or disable an alarm
pub async fn toggle_alarm(
    State(state): State<AppState>,
    Path(alarm_id): Path<String>,
) -> impl IntoResponse {
    info!("PUT /api/alarms/{}/toggle", alarm_id);

    match state.alarm_service.toggle_alarm(&alarm_id).await {
        Some(alarm) => (StatusCode::OK, Json(alarm)).into_response(),
        None => (StatusCode::NOT_FOUND, "Alarm not found").into_response(),
    }
}
