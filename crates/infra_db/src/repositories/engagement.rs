//! Engagement repository implementation
//!
//! Database access for the engagement table. Engagements are terminated,
//! never deleted, so there is no delete operation here.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the engagement table
#[derive(Debug, Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    /// Creates a new EngagementRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new engagement
    pub async fn insert(&self, engagement: NewEngagement) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO engagements (
                engagement_id, customer_id, provider_id, start_date, end_date,
                monthly_rate, payment_mode, is_active, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(engagement.engagement_id)
        .bind(engagement.customer_id)
        .bind(engagement.provider_id)
        .bind(engagement.start_date)
        .bind(engagement.end_date)
        .bind(engagement.monthly_rate)
        .bind(engagement.payment_mode)
        .bind(engagement.is_active)
        .bind(engagement.created_at)
        .bind(engagement.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::classify)?;

        Ok(())
    }

    /// Finds one engagement by identifier
    pub async fn find(&self, engagement_id: Uuid) -> Result<Option<EngagementRow>, DatabaseError> {
        let row = sqlx::query_as::<_, EngagementRow>(
            r#"
            SELECT engagement_id, customer_id, provider_id, start_date, end_date,
                   monthly_rate, payment_mode, is_active, created_at, updated_at
            FROM engagements
            WHERE engagement_id = $1
            "#,
        )
        .bind(engagement_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    /// All engagements currently flagged active, oldest first
    pub async fn list_active(&self) -> Result<Vec<EngagementRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, EngagementRow>(
            r#"
            SELECT engagement_id, customer_id, provider_id, start_date, end_date,
                   monthly_rate, payment_mode, is_active, created_at, updated_at
            FROM engagements
            WHERE is_active
            ORDER BY start_date, engagement_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Flags an engagement inactive and records its end date
    pub async fn terminate(
        &self,
        engagement_id: Uuid,
        end_date: NaiveDate,
    ) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE engagements
            SET is_active = FALSE, end_date = $2, updated_at = now()
            WHERE engagement_id = $1 AND is_active
            "#,
        )
        .bind(engagement_id)
        .bind(end_date)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::classify)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Engagement", engagement_id));
        }
        Ok(())
    }
}

/// Database row for an engagement
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EngagementRow {
    pub engagement_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub monthly_rate: Decimal,
    pub payment_mode: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data for creating a new engagement
#[derive(Debug, Clone)]
pub struct NewEngagement {
    pub engagement_id: Uuid,
    pub customer_id: Uuid,
    pub provider_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub monthly_rate: Decimal,
    pub payment_mode: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
