//! Invoice handlers

use axum::{extract::State, Json};
use validator::Validate;

use core_kernel::{Currency, Money};

use crate::dto::billing::{CalculateInvoiceRequest, InvoiceResponse};
use crate::error::ApiError;
use crate::AppState;

/// Calculates and persists one customer invoice
///
/// Returns the persisted invoice, overwriting any previous computation for
/// the same customer and month.
pub async fn calculate_invoice(
    State(state): State<AppState>,
    Json(request): Json<CalculateInvoiceRequest>,
) -> Result<Json<InvoiceResponse>, ApiError> {
    request.validate()?;

    let invoice = state
        .invoices
        .calculate_invoice(domain_billing::CalculateInvoiceRequest {
            customer_id: request.customer_id.into(),
            base_amount: Money::new(request.base_amount, Currency::INR),
            reference_date: request.reference_date,
            coupon_id: request.coupon_id.map(Into::into),
        })
        .await?;

    Ok(Json(invoice.into()))
}
