//! Billing domain ports
//!
//! Port traits define everything the billing engine needs from its
//! collaborators, enabling swappable implementations:
//!
//! - **Postgres adapters** (infra_db) for production
//! - **In-memory adapters** (test_utils) for tests
//! - **External API adapters** for the customer directory and coupon
//!   services when those live in another deployment
//!
//! The engine owns the engagement/settlement/invoice tables; customers,
//! holidays, and coupons belong to out-of-scope collaborators and are
//! reached read-only through these seams.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{CouponId, CustomerId, EngagementId, Money, ProviderId};

use crate::engagement::Engagement;
use crate::error::BillingError;
use crate::holiday::Holiday;
use crate::invoice::CustomerInvoice;
use crate::settlement::Settlement;

/// Read-only access to customer profiles and their vacation calendar
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    /// Returns true if the customer exists and is not deleted
    async fn customer_exists(&self, id: CustomerId) -> Result<bool, BillingError>;

    /// All active vacation intervals for the customer
    async fn active_holidays(&self, id: CustomerId) -> Result<Vec<Holiday>, BillingError>;
}

/// Optional coupon collaborator
///
/// Only the discount amount a coupon contributes is relevant here; code
/// validation and redemption accounting stay with the coupon service.
#[async_trait]
pub trait CouponService: Send + Sync {
    /// The discount a coupon contributes against a base amount
    async fn coupon_discount(
        &self,
        id: CouponId,
        base_amount: Money,
    ) -> Result<Money, BillingError>;
}

/// Storage for customer invoices, unique per (customer, month)
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// The invoice for a customer and month, if one was computed before
    async fn find_for_month(
        &self,
        customer_id: CustomerId,
        invoice_month: NaiveDate,
    ) -> Result<Option<CustomerInvoice>, BillingError>;

    /// Creates or overwrites the invoice row for its (customer, month)
    ///
    /// Implementations must be idempotent under concurrent recalculation:
    /// the (customer, month) uniqueness constraint decides the winner and
    /// the losing writer's amounts are applied as an update, never as a
    /// second row.
    async fn upsert(&self, invoice: &CustomerInvoice) -> Result<CustomerInvoice, BillingError>;
}

/// The engagement ledger: engagements plus their settlement chains
#[async_trait]
pub trait EngagementLedger: Send + Sync {
    /// All engagements currently being billed
    async fn list_active_engagements(&self) -> Result<Vec<Engagement>, BillingError>;

    /// Looks up one engagement
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown identifier.
    async fn find_engagement(&self, id: EngagementId) -> Result<Engagement, BillingError>;

    /// The settlement with the greatest period end for an engagement
    async fn last_settlement(
        &self,
        id: EngagementId,
    ) -> Result<Option<Settlement>, BillingError>;

    /// Advances the settlement chain through `bill_through`
    ///
    /// Reads the billing cursor and appends the next prorated settlement
    /// inside a single atomic unit: two concurrent calls for the same
    /// engagement must not both observe the same cursor. Returns `None`
    /// when the chain already covers `bill_through`.
    ///
    /// # Errors
    ///
    /// Returns `ConcurrencyConflict` when a competing writer won the
    /// period, `Persistence` for storage failures.
    async fn extend_chain(
        &self,
        engagement: &Engagement,
        bill_through: NaiveDate,
    ) -> Result<Option<Settlement>, BillingError>;

    /// Settlement history for an engagement, ordered by period start ascending
    async fn settlements_for_engagement(
        &self,
        id: EngagementId,
    ) -> Result<Vec<Settlement>, BillingError>;

    /// Settlement history across all of a provider's engagements,
    /// ordered by period start ascending
    async fn settlements_for_provider(
        &self,
        id: ProviderId,
    ) -> Result<Vec<Settlement>, BillingError>;
}
