//! Billing DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use domain_billing::{CustomerInvoice, Settlement};

#[derive(Debug, Deserialize, Validate)]
pub struct CalculateInvoiceRequest {
    pub customer_id: Uuid,
    #[validate(custom(function = "positive_amount"))]
    pub base_amount: Decimal,
    pub reference_date: Option<NaiveDate>,
    pub coupon_id: Option<Uuid>,
}

fn positive_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_positive() && !amount.is_zero() {
        Ok(())
    } else {
        Err(ValidationError::new("base_amount_not_positive"))
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RunCycleRequest {
    /// Civil date to bill for; defaults to today in the billing timezone.
    /// Exposed for operational re-runs and backfills only.
    pub run_date: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct InvoiceResponse {
    pub id: Uuid,
    pub customer_id: Uuid,
    pub invoice_month: NaiveDate,
    pub base_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon_discount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<CustomerInvoice> for InvoiceResponse {
    fn from(invoice: CustomerInvoice) -> Self {
        Self {
            id: (*invoice.id.as_uuid()),
            customer_id: (*invoice.customer_id.as_uuid()),
            invoice_month: invoice.invoice_month,
            base_amount: invoice.base_amount.amount(),
            discount_amount: invoice.discount_amount.amount(),
            final_amount: invoice.final_amount.amount(),
            coupon_id: invoice.coupon_id.map(|id| *id.as_uuid()),
            coupon_discount: invoice.coupon_discount.map(|d| d.amount()),
            created_at: invoice.created_at,
            updated_at: invoice.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettlementResponse {
    pub id: Uuid,
    pub engagement_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub day_count: u32,
    pub amount: Decimal,
    pub month_index: u32,
    pub year_index: i32,
    pub payment_mode: String,
    pub created_at: DateTime<Utc>,
}

impl From<Settlement> for SettlementResponse {
    fn from(settlement: Settlement) -> Self {
        Self {
            id: (*settlement.id.as_uuid()),
            engagement_id: (*settlement.engagement_id.as_uuid()),
            period_start: settlement.period.start,
            period_end: settlement.period.end,
            day_count: settlement.day_count,
            amount: settlement.amount.amount(),
            month_index: settlement.month_index,
            year_index: settlement.year_index,
            payment_mode: settlement.payment_mode.as_str().to_string(),
            created_at: settlement.created_at,
        }
    }
}
