//! Route table and request handlers.
//!
//! `/automate` answers both GET and POST so the service can be driven from
//! a browser address bar as well as scripted clients; a JSON body on either
//! method narrows the enabled directions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::direction::DirectionSet;
use crate::supervisor::{StartError, StartOutcome, StopOutcome};

use super::state::ServeState;

pub fn build_router(state: ServeState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/automate", get(automate).post(automate))
        .route("/stop", get(stop))
        .route("/status", get(status))
        .route("/settings", post(settings))
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Start the automation. A missing or non-JSON body means "all directions".
async fn automate(
    State(state): State<ServeState>,
    body: Option<Json<DirectionSet>>,
) -> Response {
    let requested = body.map(|Json(set)| set);
    debug!(?requested, "automate requested");
    match state.supervisor.start(requested) {
        Ok(StartOutcome::Started(directions)) => Json(json!({
            "success": true,
            "message": "Automation started",
            "status": "running",
            "directions": directions,
        }))
        .into_response(),
        Ok(StartOutcome::AlreadyRunning) => Json(json!({
            "success": true,
            "message": "Automation already running",
            "status": "running",
            "directions": state.supervisor.status().directions,
        }))
        .into_response(),
        Err(StartError::InvalidConfiguration) => (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid URL configuration" })),
        )
            .into_response(),
    }
}

async fn stop(State(state): State<ServeState>) -> Json<Value> {
    match state.supervisor.stop() {
        StopOutcome::Requested => Json(json!({ "message": "Stop requested" })),
        StopOutcome::NotRunning => Json(json!({ "message": "Automation is not running" })),
    }
}

async fn status(State(state): State<ServeState>) -> Json<Value> {
    let snapshot = state.supervisor.status();
    match snapshot.started_at.filter(|_| snapshot.is_running()) {
        Some(started_at) => {
            let uptime = (Utc::now() - started_at).num_seconds().max(0);
            Json(json!({
                "status": "running",
                "uptime": uptime,
                "startedAt": started_at.to_rfc3339(),
                "directions": snapshot.directions,
            }))
        }
        None => Json(json!({ "status": "stopped" })),
    }
}

/// Update the enabled directions; a live cycle applies them at its next
/// iteration boundary.
async fn settings(
    State(state): State<ServeState>,
    Json(set): Json<DirectionSet>,
) -> Json<Value> {
    let applied = state.supervisor.update_directions(set);
    Json(json!({ "success": true, "directions": applied }))
}
