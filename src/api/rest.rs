//! Axum health probe endpoints

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json, routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::lifecycle::{HealthStatus, LifespanManager};

use super::dto::*;

/// Application state shared across handlers
pub struct AppState {
    pub manager: Arc<LifespanManager>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(manager: Arc<LifespanManager>) -> Self {
        Self {
            manager,
            start_time: Instant::now(),
        }
    }
}

/// Create the health probe router
pub fn create_rest_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(live_handler))
        .route("/health/ready", get(ready_handler))
        .route("/health/startup", get(startup_handler))
        .fallback(not_found_handler)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Aggregated health; 503 while degraded or unhealthy
async fn health_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<HealthResponse>) {
    let summary = state.manager.health().summary();
    let code = if summary.overall_status.is_failing() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    let run_state = serde_json::to_value(state.manager.run_state())
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default();

    (
        code,
        Json(HealthResponse {
            summary,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.start_time.elapsed().as_secs(),
            run_state,
            component_metrics: state.manager.component_metrics(),
        }),
    )
}

async fn live_handler() -> (StatusCode, Json<ProbeResponse>) {
    (StatusCode::OK, Json(ProbeResponse::ok("alive")))
}

async fn ready_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ProbeResponse>) {
    match state.manager.health().overall_status() {
        HealthStatus::Healthy => (StatusCode::OK, Json(ProbeResponse::ok("ready"))),
        other => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse::failing("not_ready", format!("overall status is {}", other))),
        ),
    }
}

/// Passes once every component has reported at least once
async fn startup_handler(State(state): State<Arc<AppState>>) -> (StatusCode, Json<ProbeResponse>) {
    match state.manager.health().overall_status() {
        HealthStatus::Unknown => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ProbeResponse::failing("starting", "components have not reported yet")),
        ),
        _ => (StatusCode::OK, Json(ProbeResponse::ok("started"))),
    }
}

async fn not_found_handler() -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("no such endpoint", "NOT_FOUND")),
    )
}
