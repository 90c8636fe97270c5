//! In-memory port adapters
//!
//! Implementations of the billing domain ports backed by plain maps,
//! preserving the same observable semantics as the Postgres adapters:
//! upsert keeps the existing invoice identifier, and `extend_chain` is a
//! read-cursor-then-append step serialized per adapter.
//!
//! Engagements can be marked as failing to simulate a broken linked
//! profile or a storage fault for failure-isolation tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{CouponId, CustomerId, EngagementId, Money, ProviderId};
use domain_billing::{
    compute_settlement, next_billing_period, BillingError, CouponService, CustomerDirectory,
    CustomerInvoice, Engagement, EngagementLedger, Holiday, InvoiceStore, Settlement,
};

/// In-memory customer directory
#[derive(Default)]
pub struct InMemoryCustomerDirectory {
    customers: Mutex<HashSet<CustomerId>>,
    holidays: Mutex<HashMap<CustomerId, Vec<Holiday>>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a customer so existence checks pass
    pub fn register_customer(&self, id: CustomerId) {
        self.customers.lock().expect("directory lock").insert(id);
    }

    /// Records a holiday for its customer
    pub fn add_holiday(&self, holiday: Holiday) {
        self.holidays
            .lock()
            .expect("directory lock")
            .entry(holiday.customer_id)
            .or_default()
            .push(holiday);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn customer_exists(&self, id: CustomerId) -> Result<bool, BillingError> {
        Ok(self.customers.lock().expect("directory lock").contains(&id))
    }

    async fn active_holidays(&self, id: CustomerId) -> Result<Vec<Holiday>, BillingError> {
        Ok(self
            .holidays
            .lock()
            .expect("directory lock")
            .get(&id)
            .map(|hs| hs.iter().filter(|h| h.is_active).cloned().collect())
            .unwrap_or_default())
    }
}

/// In-memory coupon collaborator
#[derive(Default)]
pub struct InMemoryCouponService {
    coupons: Mutex<HashMap<CouponId, Money>>,
}

impl InMemoryCouponService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a coupon and the flat discount it contributes
    pub fn register_coupon(&self, id: CouponId, discount: Money) {
        self.coupons.lock().expect("coupon lock").insert(id, discount);
    }
}

#[async_trait]
impl CouponService for InMemoryCouponService {
    async fn coupon_discount(
        &self,
        id: CouponId,
        _base_amount: Money,
    ) -> Result<Money, BillingError> {
        self.coupons
            .lock()
            .expect("coupon lock")
            .get(&id)
            .copied()
            .ok_or_else(|| BillingError::not_found("Coupon", id))
    }
}

/// In-memory invoice store, unique per (customer, month)
#[derive(Default)]
pub struct InMemoryInvoiceStore {
    rows: Mutex<HashMap<(CustomerId, NaiveDate), CustomerInvoice>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored invoice rows
    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("invoice lock").len()
    }
}

#[async_trait]
impl InvoiceStore for InMemoryInvoiceStore {
    async fn find_for_month(
        &self,
        customer_id: CustomerId,
        invoice_month: NaiveDate,
    ) -> Result<Option<CustomerInvoice>, BillingError> {
        Ok(self
            .rows
            .lock()
            .expect("invoice lock")
            .get(&(customer_id, invoice_month))
            .cloned())
    }

    async fn upsert(&self, invoice: &CustomerInvoice) -> Result<CustomerInvoice, BillingError> {
        let mut rows = self.rows.lock().expect("invoice lock");
        let key = (invoice.customer_id, invoice.invoice_month);

        // Like the SQL ON CONFLICT clause, a pre-existing row keeps its
        // identifier and creation time; only the amounts move.
        let stored = match rows.get(&key) {
            Some(existing) => {
                let mut updated = invoice.clone();
                updated.id = existing.id;
                updated.created_at = existing.created_at;
                updated
            }
            None => invoice.clone(),
        };

        rows.insert(key, stored.clone());
        Ok(stored)
    }
}

/// In-memory engagement ledger with per-engagement failure injection
#[derive(Default)]
pub struct InMemoryEngagementLedger {
    engagements: Mutex<HashMap<EngagementId, Engagement>>,
    settlements: Mutex<HashMap<EngagementId, Vec<Settlement>>>,
    failing: Mutex<HashSet<EngagementId>>,
}

impl InMemoryEngagementLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an engagement to the ledger
    pub fn add_engagement(&self, engagement: Engagement) {
        self.engagements
            .lock()
            .expect("ledger lock")
            .insert(engagement.id, engagement);
    }

    /// Makes `extend_chain` fail for this engagement, simulating a missing
    /// linked profile or a storage fault
    pub fn fail_engagement(&self, id: EngagementId) {
        self.failing.lock().expect("ledger lock").insert(id);
    }

    /// Clears a previously injected failure
    pub fn heal_engagement(&self, id: EngagementId) {
        self.failing.lock().expect("ledger lock").remove(&id);
    }

    /// Number of settlements stored for an engagement
    pub fn settlement_count(&self, id: EngagementId) -> usize {
        self.settlements
            .lock()
            .expect("ledger lock")
            .get(&id)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

#[async_trait]
impl EngagementLedger for InMemoryEngagementLedger {
    async fn list_active_engagements(&self) -> Result<Vec<Engagement>, BillingError> {
        let mut active: Vec<Engagement> = self
            .engagements
            .lock()
            .expect("ledger lock")
            .values()
            .filter(|e| e.is_active)
            .cloned()
            .collect();
        active.sort_by_key(|e| (e.start_date, *e.id.as_uuid()));
        Ok(active)
    }

    async fn find_engagement(&self, id: EngagementId) -> Result<Engagement, BillingError> {
        self.engagements
            .lock()
            .expect("ledger lock")
            .get(&id)
            .cloned()
            .ok_or_else(|| BillingError::not_found("Engagement", id))
    }

    async fn last_settlement(
        &self,
        id: EngagementId,
    ) -> Result<Option<Settlement>, BillingError> {
        Ok(self
            .settlements
            .lock()
            .expect("ledger lock")
            .get(&id)
            .and_then(|chain| chain.last())
            .cloned())
    }

    async fn extend_chain(
        &self,
        engagement: &Engagement,
        bill_through: NaiveDate,
    ) -> Result<Option<Settlement>, BillingError> {
        if self
            .failing
            .lock()
            .expect("ledger lock")
            .contains(&engagement.id)
        {
            return Err(BillingError::persistence(format!(
                "simulated storage failure for engagement {}",
                engagement.id
            )));
        }

        let mut settlements = self.settlements.lock().expect("ledger lock");
        let chain = settlements.entry(engagement.id).or_default();

        let Some(period) = next_billing_period(engagement, chain.last(), bill_through)? else {
            return Ok(None);
        };

        let settlement = compute_settlement(engagement, period)?;
        chain.push(settlement.clone());
        Ok(Some(settlement))
    }

    async fn settlements_for_engagement(
        &self,
        id: EngagementId,
    ) -> Result<Vec<Settlement>, BillingError> {
        Ok(self
            .settlements
            .lock()
            .expect("ledger lock")
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }

    async fn settlements_for_provider(
        &self,
        id: ProviderId,
    ) -> Result<Vec<Settlement>, BillingError> {
        let engagement_ids: Vec<EngagementId> = self
            .engagements
            .lock()
            .expect("ledger lock")
            .values()
            .filter(|e| e.provider_id == id)
            .map(|e| e.id)
            .collect();

        let settlements = self.settlements.lock().expect("ledger lock");
        let mut result: Vec<Settlement> = engagement_ids
            .iter()
            .filter_map(|id| settlements.get(id))
            .flatten()
            .cloned()
            .collect();
        result.sort_by_key(|s| (s.period.start, *s.engagement_id.as_uuid()));
        Ok(result)
    }
}
