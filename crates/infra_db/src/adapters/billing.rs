//! PostgreSQL billing adapters
//!
//! Implements the billing domain ports on top of the repositories:
//!
//! - [`PgEngagementLedger`] — engagements and their settlement chains
//! - [`PgInvoiceStore`] — customer invoices, unique per (customer, month)
//! - [`PgCustomerDirectory`] — customer existence and vacation reads
//!
//! Amounts are stored in the marketplace's domestic currency; rows carry
//! bare decimals and the adapters reattach [`Currency::INR`] on the way out.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::debug;

use core_kernel::{Currency, CustomerId, DateRange, EngagementId, Money, ProviderId};
use domain_billing::{
    compute_settlement, next_billing_period, BillingError, CustomerDirectory, CustomerInvoice,
    Engagement, EngagementLedger, Holiday, InvoiceStore, PaymentMode, Settlement,
};

use crate::error::DatabaseError;
use crate::repositories::{
    CustomerRepository, EngagementRepository, EngagementRow, HolidayRepository, HolidayRow,
    InvoiceRepository, InvoiceRow, NewEngagement, NewInvoice, NewSettlement, SettlementRepository,
    SettlementRow,
};

/// PostgreSQL-backed implementation of the [`EngagementLedger`] port
#[derive(Debug, Clone)]
pub struct PgEngagementLedger {
    engagements: EngagementRepository,
    settlements: SettlementRepository,
    pool: PgPool,
}

impl PgEngagementLedger {
    /// Creates a new ledger adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            engagements: EngagementRepository::new(pool.clone()),
            settlements: SettlementRepository::new(pool.clone()),
            pool,
        }
    }

    /// Persists a new engagement
    ///
    /// Not part of the billing port: engagement creation belongs to the
    /// provider-directory surface, but the write lives here because this
    /// crate owns the table.
    pub async fn create_engagement(&self, engagement: &Engagement) -> Result<(), BillingError> {
        self.engagements
            .insert(engagement_to_new(engagement))
            .await?;
        Ok(())
    }

    /// Terminates an engagement effective `end_date`
    pub async fn terminate_engagement(
        &self,
        id: EngagementId,
        end_date: NaiveDate,
    ) -> Result<(), BillingError> {
        self.engagements.terminate(id.into(), end_date).await?;
        Ok(())
    }
}

#[async_trait]
impl EngagementLedger for PgEngagementLedger {
    async fn list_active_engagements(&self) -> Result<Vec<Engagement>, BillingError> {
        let rows = self.engagements.list_active().await?;
        rows.into_iter()
            .map(|row| engagement_from_row(row).map_err(BillingError::from))
            .collect()
    }

    async fn find_engagement(&self, id: EngagementId) -> Result<Engagement, BillingError> {
        let row = self
            .engagements
            .find(id.into())
            .await?
            .ok_or_else(|| BillingError::not_found("Engagement", id))?;
        Ok(engagement_from_row(row)?)
    }

    async fn last_settlement(
        &self,
        id: EngagementId,
    ) -> Result<Option<Settlement>, BillingError> {
        let row = self.settlements.last_for_engagement(id.into()).await?;
        Ok(row.map(settlement_from_row).transpose()?)
    }

    async fn extend_chain(
        &self,
        engagement: &Engagement,
        bill_through: NaiveDate,
    ) -> Result<Option<Settlement>, BillingError> {
        let mut tx = self.pool.begin().await.map_err(DatabaseError::from)?;

        // Lock the engagement row so two cycles cannot both observe the
        // same cursor, then read the cursor and append in the same
        // transaction. The schema's exclusion constraint backstops any
        // writer that bypasses the lock.
        SettlementRepository::lock_engagement(&mut *tx, engagement.id.into()).await?;

        let last = SettlementRepository::last_in_tx(&mut *tx, engagement.id.into())
            .await?
            .map(settlement_from_row)
            .transpose()?;

        let Some(period) = next_billing_period(engagement, last.as_ref(), bill_through)? else {
            // Chain already covers the month end; nothing to write.
            return Ok(None);
        };

        let settlement = compute_settlement(engagement, period)?;
        SettlementRepository::insert_in_tx(&mut *tx, settlement_to_new(&settlement)).await?;
        tx.commit().await.map_err(DatabaseError::from)?;

        debug!(
            engagement = %engagement.id,
            settlement = %settlement.id,
            period_start = %settlement.period.start,
            period_end = %settlement.period.end,
            "settlement chain extended"
        );
        Ok(Some(settlement))
    }

    async fn settlements_for_engagement(
        &self,
        id: EngagementId,
    ) -> Result<Vec<Settlement>, BillingError> {
        let rows = self.settlements.list_for_engagement(id.into()).await?;
        rows.into_iter()
            .map(|row| settlement_from_row(row).map_err(BillingError::from))
            .collect()
    }

    async fn settlements_for_provider(
        &self,
        id: ProviderId,
    ) -> Result<Vec<Settlement>, BillingError> {
        let rows = self.settlements.list_for_provider(id.into()).await?;
        rows.into_iter()
            .map(|row| settlement_from_row(row).map_err(BillingError::from))
            .collect()
    }
}

/// PostgreSQL-backed implementation of the [`InvoiceStore`] port
#[derive(Debug, Clone)]
pub struct PgInvoiceStore {
    invoices: InvoiceRepository,
}

impl PgInvoiceStore {
    /// Creates a new invoice store adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            invoices: InvoiceRepository::new(pool),
        }
    }
}

#[async_trait]
impl InvoiceStore for PgInvoiceStore {
    async fn find_for_month(
        &self,
        customer_id: CustomerId,
        invoice_month: NaiveDate,
    ) -> Result<Option<CustomerInvoice>, BillingError> {
        let row = self
            .invoices
            .find_for_month(customer_id.into(), invoice_month)
            .await?;
        Ok(row.map(invoice_from_row))
    }

    async fn upsert(&self, invoice: &CustomerInvoice) -> Result<CustomerInvoice, BillingError> {
        let row = self.invoices.upsert(invoice_to_new(invoice)).await?;
        Ok(invoice_from_row(row))
    }
}

/// PostgreSQL-backed implementation of the [`CustomerDirectory`] port
///
/// Reads the customer mirror and holiday tables maintained by the
/// customer-profile service.
#[derive(Debug, Clone)]
pub struct PgCustomerDirectory {
    customers: CustomerRepository,
    holidays: HolidayRepository,
}

impl PgCustomerDirectory {
    /// Creates a new directory adapter over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self {
            customers: CustomerRepository::new(pool.clone()),
            holidays: HolidayRepository::new(pool),
        }
    }
}

#[async_trait]
impl CustomerDirectory for PgCustomerDirectory {
    async fn customer_exists(&self, id: CustomerId) -> Result<bool, BillingError> {
        Ok(self.customers.exists(id.into()).await?)
    }

    async fn active_holidays(&self, id: CustomerId) -> Result<Vec<Holiday>, BillingError> {
        let rows = self.holidays.active_for_customer(id.into()).await?;
        rows.into_iter()
            .map(|row| holiday_from_row(row).map_err(BillingError::from))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Row <-> domain translation
// ---------------------------------------------------------------------------

fn engagement_from_row(row: EngagementRow) -> Result<Engagement, DatabaseError> {
    let payment_mode = row
        .payment_mode
        .as_deref()
        .map(str::parse::<PaymentMode>)
        .transpose()
        .map_err(|e| DatabaseError::RowMapping(e.to_string()))?;

    Ok(Engagement {
        id: row.engagement_id.into(),
        customer_id: row.customer_id.into(),
        provider_id: row.provider_id.into(),
        start_date: row.start_date,
        end_date: row.end_date,
        monthly_rate: Money::new(row.monthly_rate, Currency::INR),
        payment_mode,
        is_active: row.is_active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn engagement_to_new(engagement: &Engagement) -> NewEngagement {
    NewEngagement {
        engagement_id: engagement.id.into(),
        customer_id: engagement.customer_id.into(),
        provider_id: engagement.provider_id.into(),
        start_date: engagement.start_date,
        end_date: engagement.end_date,
        monthly_rate: engagement.monthly_rate.amount(),
        payment_mode: engagement.payment_mode.map(|m| m.as_str().to_string()),
        is_active: engagement.is_active,
        created_at: engagement.created_at,
        updated_at: engagement.updated_at,
    }
}

fn settlement_from_row(row: SettlementRow) -> Result<Settlement, DatabaseError> {
    let period = DateRange::new(row.period_start, row.period_end)
        .map_err(|e| DatabaseError::RowMapping(e.to_string()))?;
    let payment_mode = row
        .payment_mode
        .parse::<PaymentMode>()
        .map_err(|e| DatabaseError::RowMapping(e.to_string()))?;

    Ok(Settlement {
        id: row.settlement_id.into(),
        engagement_id: row.engagement_id.into(),
        period,
        day_count: row.day_count as u32,
        amount: Money::new(row.amount, Currency::INR),
        month_index: row.month_index as u32,
        year_index: row.year_index,
        payment_mode,
        created_at: row.created_at,
    })
}

fn settlement_to_new(settlement: &Settlement) -> NewSettlement {
    NewSettlement {
        settlement_id: settlement.id.into(),
        engagement_id: settlement.engagement_id.into(),
        period_start: settlement.period.start,
        period_end: settlement.period.end,
        day_count: settlement.day_count as i32,
        amount: settlement.amount.amount(),
        month_index: settlement.month_index as i32,
        year_index: settlement.year_index,
        payment_mode: settlement.payment_mode.as_str().to_string(),
        created_at: settlement.created_at,
    }
}

fn invoice_from_row(row: InvoiceRow) -> CustomerInvoice {
    CustomerInvoice {
        id: row.invoice_id.into(),
        customer_id: row.customer_id.into(),
        invoice_month: row.invoice_month,
        base_amount: Money::new(row.base_amount, Currency::INR),
        discount_amount: Money::new(row.discount_amount, Currency::INR),
        final_amount: Money::new(row.final_amount, Currency::INR),
        coupon_id: row.coupon_id.map(Into::into),
        coupon_discount: row.coupon_discount.map(|d| Money::new(d, Currency::INR)),
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn invoice_to_new(invoice: &CustomerInvoice) -> NewInvoice {
    NewInvoice {
        invoice_id: invoice.id.into(),
        customer_id: invoice.customer_id.into(),
        invoice_month: invoice.invoice_month,
        base_amount: invoice.base_amount.amount(),
        discount_amount: invoice.discount_amount.amount(),
        final_amount: invoice.final_amount.amount(),
        coupon_id: invoice.coupon_id.map(Into::into),
        coupon_discount: invoice.coupon_discount.map(|d| d.amount()),
        created_at: invoice.created_at,
        updated_at: invoice.updated_at,
    }
}

fn holiday_from_row(row: HolidayRow) -> Result<Holiday, DatabaseError> {
    let period = DateRange::new(row.start_date, row.end_date)
        .map_err(|e| DatabaseError::RowMapping(e.to_string()))?;

    Ok(Holiday {
        id: row.holiday_id.into(),
        customer_id: row.customer_id.into(),
        period,
        is_active: row.is_active,
    })
}
