//! Customer ↔ provider engagements
//!
//! An engagement is the working relationship billing periods are derived
//! from: one customer, one provider, a monthly rate, and a start date.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, EngagementId, Money, ProviderId};

use crate::error::BillingError;

/// How a provider settlement is paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    BankTransfer,
    Upi,
    Cash,
}

impl PaymentMode {
    /// Stable string form used for persistence
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMode::BankTransfer => "bank_transfer",
            PaymentMode::Upi => "upi",
            PaymentMode::Cash => "cash",
        }
    }
}

impl Default for PaymentMode {
    fn default() -> Self {
        PaymentMode::BankTransfer
    }
}

impl std::str::FromStr for PaymentMode {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bank_transfer" => Ok(PaymentMode::BankTransfer),
            "upi" => Ok(PaymentMode::Upi),
            "cash" => Ok(PaymentMode::Cash),
            other => Err(BillingError::invalid_argument(format!(
                "unknown payment mode '{}'",
                other
            ))),
        }
    }
}

/// An active working relationship between one customer and one provider
///
/// # Invariants
///
/// - `monthly_rate` is strictly positive
/// - while active, `end_date` is unset
/// - engagements are terminated, never deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Engagement {
    /// Unique identifier
    pub id: EngagementId,
    /// Customer being served
    pub customer_id: CustomerId,
    /// Provider doing the work
    pub provider_id: ProviderId,
    /// First day of the engagement; billing starts here
    pub start_date: NaiveDate,
    /// Set when the engagement is terminated
    pub end_date: Option<NaiveDate>,
    /// Full-month rate the provider is settled against
    pub monthly_rate: Money,
    /// Configured payout mode, if any
    pub payment_mode: Option<PaymentMode>,
    /// Whether the engagement is currently billed
    pub is_active: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Engagement {
    /// Creates a new active engagement
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `monthly_rate` is not strictly positive
    pub fn new(
        customer_id: CustomerId,
        provider_id: ProviderId,
        start_date: NaiveDate,
        monthly_rate: Money,
    ) -> Result<Self, BillingError> {
        if !monthly_rate.is_positive() {
            return Err(BillingError::invalid_argument(format!(
                "monthly rate must be positive, got {}",
                monthly_rate
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id: EngagementId::new_v7(),
            customer_id,
            provider_id,
            start_date,
            end_date: None,
            monthly_rate,
            payment_mode: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        })
    }

    /// Sets the configured payout mode
    pub fn with_payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = Some(mode);
        self
    }

    /// The payout mode settlements are created with
    pub fn payment_mode_or_default(&self) -> PaymentMode {
        self.payment_mode.unwrap_or_default()
    }

    /// Terminates the engagement effective `on`
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the engagement is already terminated or
    /// `on` precedes the start date
    pub fn terminate(&mut self, on: NaiveDate) -> Result<(), BillingError> {
        if !self.is_active {
            return Err(BillingError::invalid_argument(format!(
                "engagement {} is already terminated",
                self.id
            )));
        }
        if on < self.start_date {
            return Err(BillingError::invalid_argument(format!(
                "termination date {} precedes engagement start {}",
                on, self.start_date
            )));
        }

        self.is_active = false;
        self.end_date = Some(on);
        self.updated_at = Utc::now();
        Ok(())
    }
}
