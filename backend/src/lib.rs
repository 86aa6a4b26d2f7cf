//! # Calendar Alarm Clock Backend
//!
//! Backend for a personal recurring-alarm scheduler. Users define named
//! alarms with trigger times and a recurrence rule; a one-second background
//! loop evaluates them against the wall clock and hands fire events to a
//! notifier.
//!
//! The crate follows a layered architecture:
//! ```text
//! UI / HTTP clients
//!     ↓
//! IO Layer (REST handlers)
//!     ↓
//! Domain Layer (recurrence evaluation, alarm service, scheduler loop)
//!     ↓
//! Storage Layer (JSON file store)
//! ```
//!
//! The in-memory alarm list is shared between the scheduler loop (the only
//! writer of `last_triggered`) and the alarm service (writer of everything
//! else); both go through the same repository so the store file always
//! reflects the latest mutation.

pub mod domain;
pub mod io;
pub mod storage;

use std::sync::{Arc, Mutex};

use anyhow::Result;
use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, put},
    Router,
};
use log::info;
use tower_http::cors::{Any, CorsLayer};

use crate::domain::{AlarmService, LogNotifier, SchedulerService};
use crate::storage::{AlarmRepository, JsonConnection};

/// Main application state shared with every request handler
#[derive(Clone)]
pub struct AppState {
    pub alarm_service: AlarmService,
}

/// Initialize the backend: storage, shared alarm list, services.
///
/// Returns the handler state plus the scheduler, which the caller is
/// expected to spawn as a background task.
pub async fn initialize_backend() -> Result<(AppState, SchedulerService)> {
    info!("Setting up alarm store");
    let connection = JsonConnection::new_default()?;
    let repository = AlarmRepository::new(connection);

    info!("Loading alarms");
    let alarms = Arc::new(Mutex::new(repository.load_alarms().await));

    info!("Setting up domain services");
    let alarm_service = AlarmService::new(repository.clone(), Arc::clone(&alarms));
    let scheduler = SchedulerService::new(repository, alarms, Arc::new(LogNotifier));

    Ok((AppState { alarm_service }, scheduler))
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow a dev frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    // Set up our application routes
    let api_routes = Router::new()
        .route("/alarms", get(io::list_alarms).post(io::create_alarm))
        .route("/alarms/:id", delete(io::delete_alarm))
        .route("/alarms/:id/toggle", put(io::toggle_alarm));

    // Define our main application router
    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}
