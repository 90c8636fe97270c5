//! Operational billing-cycle handlers
//!
//! The cycle normally fires from the scheduler timer; these endpoints exist
//! for re-runs and backfills. Triggering is idempotent because every cycle
//! resumes from each engagement's billing cursor.

use axum::{extract::State, Json};

use domain_billing::{CycleOutcome, CycleState};

use crate::dto::billing::RunCycleRequest;
use crate::error::ApiError;
use crate::AppState;

/// Triggers one billing cycle
///
/// Returns 409 if a cycle is already running; the caller should retry
/// after the running cycle completes.
pub async fn run_cycle(
    State(state): State<AppState>,
    request: Option<Json<RunCycleRequest>>,
) -> Result<Json<CycleOutcome>, ApiError> {
    let run_date = request
        .and_then(|Json(r)| r.run_date)
        .unwrap_or_else(|| state.timezone.today());

    let outcome = state.scheduler.run_cycle(run_date).await?;
    Ok(Json(outcome))
}

/// The scheduler's current cycle state
pub async fn cycle_status(State(state): State<AppState>) -> Json<CycleState> {
    Json(state.scheduler.state().await)
}
