//! Settlement history handlers

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::dto::billing::SettlementResponse;
use crate::error::ApiError;
use crate::AppState;

/// Settlement history for one engagement, ordered by period start
pub async fn list_for_engagement(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SettlementResponse>>, ApiError> {
    let settlements = state.ledger.settlements_for_engagement(id.into()).await?;
    Ok(Json(settlements.into_iter().map(Into::into).collect()))
}

/// Settlement history across all engagements of one provider
pub async fn list_for_provider(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<SettlementResponse>>, ApiError> {
    let settlements = state.ledger.settlements_for_provider(id.into()).await?;
    Ok(Json(settlements.into_iter().map(Into::into).collect()))
}
