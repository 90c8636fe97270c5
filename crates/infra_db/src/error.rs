//! Database error types
//!
//! This module defines the error types that can occur during database
//! operations and the translation onto the billing domain's error taxonomy.

use thiserror::Error;

use domain_billing::BillingError;

/// Errors that can occur during database operations
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Failed to establish a database connection
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Entity not found in database
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Exclusion constraint violation (overlapping settlement periods)
    #[error("Settlement period overlap detected: {0}")]
    PeriodOverlap(String),

    /// Transaction error
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Row data did not map onto a domain value
    #[error("Row mapping error: {0}")]
    RowMapping(String),

    /// Pool exhaustion - no available connections
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Generic SQL error
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Creates a not found error for a specific entity type and identifier
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    /// Maps a SQLx error onto a specific variant using the PostgreSQL
    /// error code, so that constraint races surface as such instead of
    /// as generic query failures.
    ///
    /// Error codes: <https://www.postgresql.org/docs/current/errcodes-appendix.html>
    pub fn classify(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound("Record not found".to_string())
            }
            sqlx::Error::PoolTimedOut => DatabaseError::PoolExhausted,
            sqlx::Error::Database(db_err) => {
                if let Some(code) = db_err.code() {
                    match code.as_ref() {
                        "23505" => DatabaseError::DuplicateEntry(db_err.message().to_string()),
                        "23503" => {
                            DatabaseError::ForeignKeyViolation(db_err.message().to_string())
                        }
                        "23514" => {
                            DatabaseError::ConstraintViolation(db_err.message().to_string())
                        }
                        "23P01" => DatabaseError::PeriodOverlap(db_err.message().to_string()),
                        _ => DatabaseError::QueryFailed(db_err.message().to_string()),
                    }
                } else {
                    DatabaseError::QueryFailed(db_err.message().to_string())
                }
            }
            _ => DatabaseError::SqlError(error),
        }
    }

    /// Checks if this error indicates a record was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound(_))
    }

    /// Checks if this error is a constraint violation
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            DatabaseError::DuplicateEntry(_)
                | DatabaseError::ForeignKeyViolation(_)
                | DatabaseError::ConstraintViolation(_)
                | DatabaseError::PeriodOverlap(_)
        )
    }
}

/// Translates database failures onto the billing domain taxonomy
///
/// Constraint races on the settlement chain (duplicate period start or
/// overlapping period range) become `ConcurrencyConflict` so the caller
/// knows a competing writer won and a retry would be safe.
impl From<DatabaseError> for BillingError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound(msg) => BillingError::NotFound(msg),
            DatabaseError::DuplicateEntry(msg) | DatabaseError::PeriodOverlap(msg) => {
                BillingError::ConcurrencyConflict(msg)
            }
            other => BillingError::Persistence(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_helper() {
        let err = DatabaseError::not_found("Engagement", "ENG-123");
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Engagement"));
    }

    #[test]
    fn test_constraint_violations_map_to_concurrency_conflict() {
        let err = DatabaseError::DuplicateEntry("settlements_engagement_id_period_start_key".into());
        assert!(err.is_constraint_violation());
        assert!(matches!(
            BillingError::from(err),
            BillingError::ConcurrencyConflict(_)
        ));

        let err = DatabaseError::PeriodOverlap("settlements_no_overlap_excl".into());
        let billing = BillingError::from(err);
        assert!(matches!(billing, BillingError::ConcurrencyConflict(_)));
        assert!(billing.is_retryable());
    }

    #[test]
    fn test_other_errors_map_to_persistence() {
        let err = DatabaseError::QueryFailed("boom".into());
        assert!(matches!(BillingError::from(err), BillingError::Persistence(_)));
    }
}
