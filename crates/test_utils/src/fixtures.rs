//! Pre-built Test Fixtures
//!
//! Ready-to-use test data for the billing engine. Fixtures are consistent
//! and predictable so that numeric expectations stay readable in tests.

use chrono::NaiveDate;
use core_kernel::{CustomerId, Money, Currency, ProviderId};
use once_cell::sync::Lazy;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// The canonical invoice base amount (daily rate 1000)
    pub fn base_30000() -> Money {
        Money::new(dec!(30000), Currency::INR)
    }

    /// The canonical engagement monthly rate
    pub fn rate_3000() -> Money {
        Money::new(dec!(3000), Currency::INR)
    }

    /// A small coupon discount
    pub fn coupon_500() -> Money {
        Money::new(dec!(500), Currency::INR)
    }

    /// A zero INR amount
    pub fn zero() -> Money {
        Money::zero(Currency::INR)
    }
}

/// Fixture for calendar test data
pub struct DateFixtures;

impl DateFixtures {
    /// Mid-February engagement start in a leap year (Feb has 29 days)
    pub fn leap_feb_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
    }

    /// The leap-year February month end
    pub fn leap_feb_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
    }

    /// First day of March 2024
    pub fn march_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    /// Last day of March 2024
    pub fn march_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    /// An arbitrary mid-March reference date
    pub fn mid_march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }
}

static FIXED_CUSTOMER: Lazy<Uuid> =
    Lazy::new(|| Uuid::parse_str("f8a7b3c1-0f51-4b2e-9d3a-6f1e2c4b5a60").unwrap());
static FIXED_PROVIDER: Lazy<Uuid> =
    Lazy::new(|| Uuid::parse_str("1c9e4d2b-7a86-4f03-b5c1-8e2d9f0a3b71").unwrap());

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A stable customer identifier, the same across a test run
    pub fn customer() -> CustomerId {
        CustomerId::from_uuid(*FIXED_CUSTOMER)
    }

    /// A stable provider identifier, the same across a test run
    pub fn provider() -> ProviderId {
        ProviderId::from_uuid(*FIXED_PROVIDER)
    }
}
