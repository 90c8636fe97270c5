//! Customer invoice calculation
//!
//! Invoices are computed on demand from a fixed 30-day daily rate and the
//! customer's vacation days in the invoice month. At most one invoice row
//! exists per customer and month; recomputation overwrites it in place.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{CouponId, CustomerId, InvoiceId, Money};

use crate::discount::vacation_discount;
use crate::error::BillingError;

/// Month length used for the customer-side daily rate
///
/// The daily rate divides the base amount by a flat 30 regardless of the
/// actual month length. Provider settlements use the real calendar month
/// instead; the asymmetry is inherited billing policy, not an accident.
pub const BILLING_MONTH_DAYS: u32 = 30;

/// The amounts produced by one invoice calculation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceAmounts {
    /// Vacation days counted inside the invoice month
    pub vacation_days: u32,
    /// Amount before discounts
    pub base_amount: Money,
    /// Vacation discount subtracted from the base
    pub discount_amount: Money,
    /// Coupon discount subtracted additively, if a coupon applied
    pub coupon_discount: Option<Money>,
    /// Amount the customer owes
    pub final_amount: Money,
}

/// Computes invoice amounts from the base amount and vacation days
///
/// The daily rate is `base / 30`; the vacation discount is
/// `daily_rate × vacation_days × tier_percent`. A coupon discount, when
/// present, is subtracted on top of the vacation discount.
///
/// # Errors
///
/// Returns `InvalidArgument` if `base_amount` is not strictly positive.
pub fn compute_invoice_amounts(
    base_amount: Money,
    vacation_days: u32,
    coupon_discount: Option<Money>,
) -> Result<InvoiceAmounts, BillingError> {
    if !base_amount.is_positive() {
        return Err(BillingError::invalid_argument(format!(
            "base amount must be positive, got {}",
            base_amount
        )));
    }

    let daily_rate = base_amount.divide(Decimal::from(BILLING_MONTH_DAYS))?;
    let tier = vacation_discount(vacation_days);
    let discount_amount = tier
        .apply(&daily_rate.multiply(Decimal::from(vacation_days)))
        .round_to_currency();

    let mut final_amount = base_amount.checked_sub(&discount_amount)?;
    if let Some(coupon) = &coupon_discount {
        final_amount = final_amount.checked_sub(coupon)?;
    }

    Ok(InvoiceAmounts {
        vacation_days,
        base_amount,
        discount_amount,
        coupon_discount,
        final_amount: final_amount.round_to_currency(),
    })
}

/// One computed monthly bill for a customer
///
/// # Invariants
///
/// - at most one invoice per (customer, invoice month), enforced by storage
/// - `invoice_month` is always the first day of a calendar month
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInvoice {
    /// Unique identifier
    pub id: InvoiceId,
    /// Customer being billed
    pub customer_id: CustomerId,
    /// First day of the billed calendar month
    pub invoice_month: NaiveDate,
    /// Amount before discounts
    pub base_amount: Money,
    /// Vacation discount
    pub discount_amount: Money,
    /// Amount owed after all discounts
    pub final_amount: Money,
    /// Coupon applied to this invoice, if any
    pub coupon_id: Option<CouponId>,
    /// Discount the coupon contributed
    pub coupon_discount: Option<Money>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl CustomerInvoice {
    /// Creates a fresh invoice for a customer and month
    pub fn new(
        customer_id: CustomerId,
        invoice_month: NaiveDate,
        amounts: InvoiceAmounts,
        coupon_id: Option<CouponId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            customer_id,
            invoice_month,
            base_amount: amounts.base_amount,
            discount_amount: amounts.discount_amount,
            final_amount: amounts.final_amount,
            coupon_id,
            coupon_discount: amounts.coupon_discount,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the amounts in place, keeping the identifier
    ///
    /// Used when an invoice for the same customer and month already exists:
    /// the row is updated rather than duplicated.
    pub fn recalculate(&mut self, amounts: InvoiceAmounts, coupon_id: Option<CouponId>) {
        self.base_amount = amounts.base_amount;
        self.discount_amount = amounts.discount_amount;
        self.final_amount = amounts.final_amount;
        self.coupon_id = coupon_id;
        self.coupon_discount = amounts.coupon_discount;
        self.updated_at = Utc::now();
    }
}
