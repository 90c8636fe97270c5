//! Holiday repository implementation
//!
//! Holidays are maintained by the customer-profile service; the billing
//! engine reads them as discount input. The write operations exist for
//! seeding and operational tooling only.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the holiday table
#[derive(Debug, Clone)]
pub struct HolidayRepository {
    pool: PgPool,
}

impl HolidayRepository {
    /// Creates a new HolidayRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All active vacation intervals for a customer
    pub async fn active_for_customer(
        &self,
        customer_id: Uuid,
    ) -> Result<Vec<HolidayRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, HolidayRow>(
            r#"
            SELECT holiday_id, customer_id, start_date, end_date, is_active
            FROM holidays
            WHERE customer_id = $1 AND is_active
            ORDER BY start_date
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a holiday row
    pub async fn insert(&self, holiday: HolidayRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO holidays (holiday_id, customer_id, start_date, end_date, is_active)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(holiday.holiday_id)
        .bind(holiday.customer_id)
        .bind(holiday.start_date)
        .bind(holiday.end_date)
        .bind(holiday.is_active)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::classify)?;

        Ok(())
    }

    /// Deactivates a holiday
    pub async fn deactivate(&self, holiday_id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            "UPDATE holidays SET is_active = FALSE WHERE holiday_id = $1 AND is_active",
        )
        .bind(holiday_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("Holiday", holiday_id));
        }
        Ok(())
    }
}

/// Database row for a holiday
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HolidayRow {
    pub holiday_id: Uuid,
    pub customer_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
}
