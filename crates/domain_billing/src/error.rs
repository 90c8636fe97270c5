//! Billing domain errors

use core_kernel::{MoneyError, TemporalError};
use thiserror::Error;

/// Errors that can occur in the billing domain
#[derive(Debug, Error)]
pub enum BillingError {
    /// Malformed input: non-positive amounts, inverted date ranges
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unknown customer, provider, engagement, or coupon identifier
    #[error("Not found: {0}")]
    NotFound(String),

    /// Two writers raced to create overlapping settlement periods
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Transient storage failure
    #[error("Persistence failure: {0}")]
    Persistence(String),

    /// Decimal or rounding fault during amount computation
    #[error("Calculation error: {0}")]
    Calculation(String),
}

impl BillingError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        BillingError::InvalidArgument(message.into())
    }

    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        BillingError::NotFound(format!("{} with id '{}' not found", entity, id))
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        BillingError::Persistence(message.into())
    }

    /// Returns true if a later retry of the same operation could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BillingError::ConcurrencyConflict(_) | BillingError::Persistence(_)
        )
    }
}

impl From<MoneyError> for BillingError {
    fn from(err: MoneyError) -> Self {
        BillingError::Calculation(err.to_string())
    }
}

impl From<TemporalError> for BillingError {
    fn from(err: TemporalError) -> Self {
        BillingError::InvalidArgument(err.to_string())
    }
}
