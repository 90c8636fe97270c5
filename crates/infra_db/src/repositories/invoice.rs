//! Customer invoice repository implementation
//!
//! One invoice row per (customer, invoice month), guarded by a uniqueness
//! constraint. Recomputation goes through `upsert`, which resolves the
//! conflict in the database rather than by read-then-write in the caller.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the customer invoice table
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The invoice for a customer and month, if one exists
    pub async fn find_for_month(
        &self,
        customer_id: Uuid,
        invoice_month: NaiveDate,
    ) -> Result<Option<InvoiceRow>, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoice_id, customer_id, invoice_month, base_amount,
                   discount_amount, final_amount, coupon_id, coupon_discount,
                   created_at, updated_at
            FROM customer_invoices
            WHERE customer_id = $1 AND invoice_month = $2
            "#,
        )
        .bind(customer_id)
        .bind(invoice_month)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Creates or overwrites the invoice row for its (customer, month)
    ///
    /// On conflict the existing row keeps its identifier and creation time;
    /// only the amounts and coupon fields are overwritten. The surviving
    /// row is returned, so a losing concurrent writer still observes a
    /// single consistent invoice.
    pub async fn upsert(&self, invoice: NewInvoice) -> Result<InvoiceRow, DatabaseError> {
        let row = sqlx::query_as::<_, InvoiceRow>(
            r#"
            INSERT INTO customer_invoices (
                invoice_id, customer_id, invoice_month, base_amount,
                discount_amount, final_amount, coupon_id, coupon_discount,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (customer_id, invoice_month) DO UPDATE SET
                base_amount = EXCLUDED.base_amount,
                discount_amount = EXCLUDED.discount_amount,
                final_amount = EXCLUDED.final_amount,
                coupon_id = EXCLUDED.coupon_id,
                coupon_discount = EXCLUDED.coupon_discount,
                updated_at = EXCLUDED.updated_at
            RETURNING invoice_id, customer_id, invoice_month, base_amount,
                      discount_amount, final_amount, coupon_id, coupon_discount,
                      created_at, updated_at
            "#,
        )
        .bind(invoice.invoice_id)
        .bind(invoice.customer_id)
        .bind(invoice.invoice_month)
        .bind(invoice.base_amount)
        .bind(invoice.discount_amount)
        .bind(invoice.final_amount)
        .bind(invoice.coupon_id)
        .bind(invoice.coupon_discount)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::classify)?;

        Ok(row)
    }
}

/// Database row for a customer invoice
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvoiceRow {
    pub invoice_id: Uuid,
    pub customer_id: Uuid,
    pub invoice_month: NaiveDate,
    pub base_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub coupon_id: Option<Uuid>,
    pub coupon_discount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating or overwriting an invoice
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub invoice_id: Uuid,
    pub customer_id: Uuid,
    pub invoice_month: NaiveDate,
    pub base_amount: Decimal,
    pub discount_amount: Decimal,
    pub final_amount: Decimal,
    pub coupon_id: Option<Uuid>,
    pub coupon_discount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
