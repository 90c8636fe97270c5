//! Test Data Builders
//!
//! Builder patterns for constructing test data with sensible defaults.
//! Tests specify only the relevant fields and take defaults for the rest.

use chrono::NaiveDate;
use core_kernel::{CustomerId, Money, ProviderId};
use domain_billing::{Engagement, Holiday, PaymentMode};

use crate::fixtures::{DateFixtures, IdFixtures, MoneyFixtures};

/// Builder for test engagements
pub struct EngagementBuilder {
    customer_id: CustomerId,
    provider_id: ProviderId,
    start_date: NaiveDate,
    monthly_rate: Money,
    payment_mode: Option<PaymentMode>,
    terminated_on: Option<NaiveDate>,
}

impl Default for EngagementBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngagementBuilder {
    /// Creates a builder with default values: the fixture customer and
    /// provider, a leap-February start, and a 3000 monthly rate
    pub fn new() -> Self {
        Self {
            customer_id: IdFixtures::customer(),
            provider_id: IdFixtures::provider(),
            start_date: DateFixtures::leap_feb_start(),
            monthly_rate: MoneyFixtures::rate_3000(),
            payment_mode: None,
            terminated_on: None,
        }
    }

    /// Sets the customer
    pub fn with_customer(mut self, id: CustomerId) -> Self {
        self.customer_id = id;
        self
    }

    /// Sets the provider
    pub fn with_provider(mut self, id: ProviderId) -> Self {
        self.provider_id = id;
        self
    }

    /// Sets the start date
    pub fn with_start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Sets the monthly rate
    pub fn with_monthly_rate(mut self, rate: Money) -> Self {
        self.monthly_rate = rate;
        self
    }

    /// Sets the configured payout mode
    pub fn with_payment_mode(mut self, mode: PaymentMode) -> Self {
        self.payment_mode = Some(mode);
        self
    }

    /// Builds the engagement already terminated on the given date
    pub fn terminated_on(mut self, date: NaiveDate) -> Self {
        self.terminated_on = Some(date);
        self
    }

    /// Builds the engagement
    pub fn build(self) -> Engagement {
        let mut engagement = Engagement::new(
            self.customer_id,
            self.provider_id,
            self.start_date,
            self.monthly_rate,
        )
        .expect("builder defaults are valid");

        if let Some(mode) = self.payment_mode {
            engagement = engagement.with_payment_mode(mode);
        }
        if let Some(on) = self.terminated_on {
            engagement
                .terminate(on)
                .expect("builder termination date is valid");
        }
        engagement
    }
}

/// Builder for test holidays
pub struct HolidayBuilder {
    customer_id: CustomerId,
    start: NaiveDate,
    end: NaiveDate,
    active: bool,
}

impl Default for HolidayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HolidayBuilder {
    /// Creates a builder with default values: the fixture customer on a
    /// five-day March vacation
    pub fn new() -> Self {
        Self {
            customer_id: IdFixtures::customer(),
            start: NaiveDate::from_ymd_opt(2024, 3, 11).unwrap(),
            end: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            active: true,
        }
    }

    /// Sets the customer
    pub fn with_customer(mut self, id: CustomerId) -> Self {
        self.customer_id = id;
        self
    }

    /// Sets the vacation interval
    pub fn spanning(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Builds the holiday already deactivated
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the holiday
    pub fn build(self) -> Holiday {
        let mut holiday = Holiday::new(self.customer_id, self.start, self.end)
            .expect("builder interval is valid");
        if !self.active {
            holiday.deactivate();
        }
        holiday
    }
}
