//! Health handlers

use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::AppState;

/// Liveness check
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Readiness check
///
/// Reports the scheduler's cycle state so operators can see at a glance
/// whether a billing run is in flight.
pub async fn readiness_check(State(state): State<AppState>) -> Json<Value> {
    let cycle = state.scheduler.state().await;
    Json(json!({
        "status": "ready",
        "billing_cycle": cycle,
    }))
}
