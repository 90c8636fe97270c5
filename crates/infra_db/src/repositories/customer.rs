//! Customer existence checks
//!
//! The customer-profile service owns customer data; the billing engine only
//! verifies that an identifier refers to a live customer before invoicing.

use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Read-only repository over the customer mirror table
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: PgPool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns true if the customer exists and is active
    pub async fn exists(&self, customer_id: Uuid) -> Result<bool, DatabaseError> {
        let found = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM customers WHERE customer_id = $1 AND is_active",
        )
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(found.is_some())
    }
}
