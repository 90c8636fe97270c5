//! Settlement repository implementation
//!
//! The settlement table is append-only. The read-cursor-then-append
//! sequence runs inside a caller-owned transaction, so the in-transaction
//! operations here take a `PgConnection` instead of the pool.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the append-only settlement ledger
#[derive(Debug, Clone)]
pub struct SettlementRepository {
    pool: PgPool,
}

impl SettlementRepository {
    /// Creates a new SettlementRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The settlement with the greatest period end for an engagement
    pub async fn last_for_engagement(
        &self,
        engagement_id: Uuid,
    ) -> Result<Option<SettlementRow>, DatabaseError> {
        let row = sqlx::query_as::<_, SettlementRow>(
            r#"
            SELECT settlement_id, engagement_id, period_start, period_end,
                   day_count, amount, month_index, year_index, payment_mode, created_at
            FROM settlements
            WHERE engagement_id = $1
            ORDER BY period_end DESC
            LIMIT 1
            "#,
        )
        .bind(engagement_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// Settlement history for an engagement, ordered by period start ascending
    pub async fn list_for_engagement(
        &self,
        engagement_id: Uuid,
    ) -> Result<Vec<SettlementRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, SettlementRow>(
            r#"
            SELECT settlement_id, engagement_id, period_start, period_end,
                   day_count, amount, month_index, year_index, payment_mode, created_at
            FROM settlements
            WHERE engagement_id = $1
            ORDER BY period_start
            "#,
        )
        .bind(engagement_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Settlement history across all engagements of one provider,
    /// ordered by period start ascending
    pub async fn list_for_provider(
        &self,
        provider_id: Uuid,
    ) -> Result<Vec<SettlementRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, SettlementRow>(
            r#"
            SELECT s.settlement_id, s.engagement_id, s.period_start, s.period_end,
                   s.day_count, s.amount, s.month_index, s.year_index,
                   s.payment_mode, s.created_at
            FROM settlements s
            JOIN engagements e ON e.engagement_id = s.engagement_id
            WHERE e.provider_id = $1
            ORDER BY s.period_start, s.engagement_id
            "#,
        )
        .bind(provider_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Locks the engagement row for the duration of the transaction
    ///
    /// Serializes concurrent cursor reads for the same engagement: a second
    /// writer blocks here until the first commits, then observes the
    /// advanced cursor.
    pub async fn lock_engagement(
        conn: &mut PgConnection,
        engagement_id: Uuid,
    ) -> Result<(), DatabaseError> {
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT engagement_id FROM engagements WHERE engagement_id = $1 FOR UPDATE",
        )
        .bind(engagement_id)
        .fetch_optional(&mut *conn)
        .await?;

        if locked.is_none() {
            return Err(DatabaseError::not_found("Engagement", engagement_id));
        }
        Ok(())
    }

    /// In-transaction variant of [`Self::last_for_engagement`]
    pub async fn last_in_tx(
        conn: &mut PgConnection,
        engagement_id: Uuid,
    ) -> Result<Option<SettlementRow>, DatabaseError> {
        let row = sqlx::query_as::<_, SettlementRow>(
            r#"
            SELECT settlement_id, engagement_id, period_start, period_end,
                   day_count, amount, month_index, year_index, payment_mode, created_at
            FROM settlements
            WHERE engagement_id = $1
            ORDER BY period_end DESC
            LIMIT 1
            "#,
        )
        .bind(engagement_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row)
    }

    /// Appends one settlement row inside the caller's transaction
    ///
    /// A constraint violation here means a competing writer created the
    /// period first; it is classified so the adapter can surface it as a
    /// concurrency conflict.
    pub async fn insert_in_tx(
        conn: &mut PgConnection,
        settlement: NewSettlement,
    ) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO settlements (
                settlement_id, engagement_id, period_start, period_end,
                day_count, amount, month_index, year_index, payment_mode, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(settlement.settlement_id)
        .bind(settlement.engagement_id)
        .bind(settlement.period_start)
        .bind(settlement.period_end)
        .bind(settlement.day_count)
        .bind(settlement.amount)
        .bind(settlement.month_index)
        .bind(settlement.year_index)
        .bind(settlement.payment_mode)
        .bind(settlement.created_at)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::classify)?;

        Ok(())
    }
}

/// Database row for a settlement
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SettlementRow {
    pub settlement_id: Uuid,
    pub engagement_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub day_count: i32,
    pub amount: Decimal,
    pub month_index: i32,
    pub year_index: i32,
    pub payment_mode: String,
    pub created_at: DateTime<Utc>,
}

/// Data for appending a new settlement
#[derive(Debug, Clone)]
pub struct NewSettlement {
    pub settlement_id: Uuid,
    pub engagement_id: Uuid,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub day_count: i32,
    pub amount: Decimal,
    pub month_index: i32,
    pub year_index: i32,
    pub payment_mode: String,
    pub created_at: DateTime<Utc>,
}
