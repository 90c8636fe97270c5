//! Billing domain services
//!
//! Application-facing orchestration over the port traits: the on-demand
//! invoice calculation entry point.

use std::sync::Arc;

use chrono::NaiveDate;

use core_kernel::{month_start, CouponId, CustomerId, DateRange, Money, Timezone};

use crate::error::BillingError;
use crate::holiday::vacation_days_within;
use crate::invoice::{compute_invoice_amounts, CustomerInvoice};
use crate::ports::{CouponService, CustomerDirectory, InvoiceStore};

/// Input for one invoice calculation
#[derive(Debug, Clone)]
pub struct CalculateInvoiceRequest {
    /// Customer to bill
    pub customer_id: CustomerId,
    /// Amount before discounts
    pub base_amount: Money,
    /// Day the invoice month is derived from; defaults to today in the
    /// marketplace timezone
    pub reference_date: Option<NaiveDate>,
    /// Coupon to apply additively, if any
    pub coupon_id: Option<CouponId>,
}

/// Computes and persists customer invoices on demand
///
/// One calculation produces exactly one persisted row: either a new invoice
/// for the (customer, month) pair or an overwrite of the existing one.
/// Errors surface synchronously and leave no partial writes.
pub struct InvoiceService {
    customers: Arc<dyn CustomerDirectory>,
    invoices: Arc<dyn InvoiceStore>,
    coupons: Option<Arc<dyn CouponService>>,
    timezone: Timezone,
}

impl InvoiceService {
    /// Creates a new invoice service
    pub fn new(
        customers: Arc<dyn CustomerDirectory>,
        invoices: Arc<dyn InvoiceStore>,
        timezone: Timezone,
    ) -> Self {
        Self {
            customers,
            invoices,
            coupons: None,
            timezone,
        }
    }

    /// Attaches the optional coupon collaborator
    pub fn with_coupons(mut self, coupons: Arc<dyn CouponService>) -> Self {
        self.coupons = Some(coupons);
        self
    }

    /// Calculates and persists one customer invoice
    ///
    /// 1. Verifies the customer exists and the base amount is positive
    /// 2. Counts the customer's active vacation days inside the invoice month
    /// 3. Applies the vacation discount tier and any coupon discount
    /// 4. Upserts the single invoice row for (customer, invoice month)
    ///
    /// # Errors
    ///
    /// - `NotFound` for an unknown customer
    /// - `InvalidArgument` for a non-positive base amount, or a coupon
    ///   reference without a configured coupon collaborator
    /// - `Persistence` when the upsert fails (nothing was written)
    pub async fn calculate_invoice(
        &self,
        request: CalculateInvoiceRequest,
    ) -> Result<CustomerInvoice, BillingError> {
        if !request.base_amount.is_positive() {
            return Err(BillingError::invalid_argument(format!(
                "base amount must be positive, got {}",
                request.base_amount
            )));
        }

        if !self.customers.customer_exists(request.customer_id).await? {
            return Err(BillingError::not_found("Customer", request.customer_id));
        }

        let reference = request
            .reference_date
            .unwrap_or_else(|| self.timezone.today());
        let invoice_month = DateRange::month_of(reference);

        let holidays = self.customers.active_holidays(request.customer_id).await?;
        let vacation_days = vacation_days_within(&holidays, &invoice_month);

        let coupon_discount = match request.coupon_id {
            Some(coupon_id) => {
                let coupons = self.coupons.as_ref().ok_or_else(|| {
                    BillingError::invalid_argument(
                        "coupon referenced but no coupon collaborator is configured",
                    )
                })?;
                Some(
                    coupons
                        .coupon_discount(coupon_id, request.base_amount)
                        .await?,
                )
            }
            None => None,
        };

        let amounts =
            compute_invoice_amounts(request.base_amount, vacation_days, coupon_discount)?;

        tracing::debug!(
            customer = %request.customer_id,
            month = %invoice_month.start,
            vacation_days,
            discount = %amounts.discount_amount,
            "invoice amounts computed"
        );

        let invoice = match self
            .invoices
            .find_for_month(request.customer_id, month_start(reference))
            .await?
        {
            Some(mut existing) => {
                existing.recalculate(amounts, request.coupon_id);
                existing
            }
            None => CustomerInvoice::new(
                request.customer_id,
                month_start(reference),
                amounts,
                request.coupon_id,
            ),
        };

        self.invoices.upsert(&invoice).await
    }
}
