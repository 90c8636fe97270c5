//! Customer vacation intervals
//!
//! Holidays are maintained by the customer-profile service; the billing
//! engine only reads them as discount input.

use serde::{Deserialize, Serialize};

use core_kernel::{CustomerId, DateRange, HolidayId};

use crate::error::BillingError;

/// A vacation interval for a customer, endpoints inclusive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Holiday {
    /// Unique identifier
    pub id: HolidayId,
    /// Customer on vacation
    pub customer_id: CustomerId,
    /// Inclusive vacation interval
    pub period: DateRange,
    /// Deactivated holidays are ignored by invoice calculation
    pub is_active: bool,
}

impl Holiday {
    /// Creates a new active holiday
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the end date precedes the start date
    pub fn new(
        customer_id: CustomerId,
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    ) -> Result<Self, BillingError> {
        Ok(Self {
            id: HolidayId::new_v7(),
            customer_id,
            period: DateRange::new(start, end)?,
            is_active: true,
        })
    }

    /// Marks the holiday as cancelled
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Number of vacation days, endpoints included
    pub fn day_count(&self) -> u32 {
        self.period.day_count()
    }
}

/// Total vacation days from `holidays` falling inside `window`
///
/// Each active interval is clamped to the window before counting, so a
/// vacation spanning a month boundary only contributes its in-month days.
/// Inactive holidays contribute nothing. Intervals are summed independently;
/// the profile service guarantees they do not overlap per customer.
pub fn vacation_days_within(holidays: &[Holiday], window: &DateRange) -> u32 {
    holidays
        .iter()
        .filter(|h| h.is_active)
        .filter_map(|h| h.period.intersect(window))
        .map(|overlap| overlap.day_count())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn march() -> DateRange {
        DateRange::month_of(d(2024, 3, 1))
    }

    #[test]
    fn test_single_holiday_counts_inclusive_days() {
        let customer = CustomerId::new();
        let holidays = vec![Holiday::new(customer, d(2024, 3, 10), d(2024, 3, 14)).unwrap()];

        assert_eq!(vacation_days_within(&holidays, &march()), 5);
    }

    #[test]
    fn test_holiday_spanning_month_boundary_is_clamped() {
        let customer = CustomerId::new();
        let holidays = vec![Holiday::new(customer, d(2024, 2, 27), d(2024, 3, 3)).unwrap()];

        // Only Mar 1-3 fall inside the window
        assert_eq!(vacation_days_within(&holidays, &march()), 3);
    }

    #[test]
    fn test_inactive_holidays_are_ignored() {
        let customer = CustomerId::new();
        let mut holiday = Holiday::new(customer, d(2024, 3, 5), d(2024, 3, 9)).unwrap();
        holiday.deactivate();

        assert_eq!(vacation_days_within(&[holiday], &march()), 0);
    }

    #[test]
    fn test_multiple_intervals_are_summed() {
        let customer = CustomerId::new();
        let holidays = vec![
            Holiday::new(customer, d(2024, 3, 1), d(2024, 3, 3)).unwrap(),
            Holiday::new(customer, d(2024, 3, 20), d(2024, 3, 26)).unwrap(),
        ];

        assert_eq!(vacation_days_within(&holidays, &march()), 10);
    }

    #[test]
    fn test_holiday_outside_window_contributes_nothing() {
        let customer = CustomerId::new();
        let holidays = vec![Holiday::new(customer, d(2024, 4, 1), d(2024, 4, 10)).unwrap()];

        assert_eq!(vacation_days_within(&holidays, &march()), 0);
    }

    #[test]
    fn test_inverted_interval_is_rejected() {
        let result = Holiday::new(CustomerId::new(), d(2024, 3, 10), d(2024, 3, 9));
        assert!(matches!(result, Err(BillingError::InvalidArgument(_))));
    }
}
