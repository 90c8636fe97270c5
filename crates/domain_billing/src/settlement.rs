//! Provider settlements and proration
//!
//! A settlement is one immutable billing period for one engagement. The
//! amount is the monthly rate prorated by the period's day count against
//! the real length of the calendar month the period ends in.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{days_in_month, DateRange, EngagementId, Money, SettlementId};

use crate::engagement::{Engagement, PaymentMode};
use crate::error::BillingError;

/// One immutable, non-overlapping billing period for an engagement
///
/// # Invariants
///
/// For a given engagement the ordered settlements partition time contiguously
/// from the engagement's start date: `period_start(n+1) == period_end(n) + 1 day`.
/// Rows are append-only and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier
    pub id: SettlementId,
    /// Engagement this period belongs to
    pub engagement_id: EngagementId,
    /// Inclusive billing period
    pub period: DateRange,
    /// Days in the period, endpoints included
    pub day_count: u32,
    /// Prorated amount in whole currency units
    pub amount: Money,
    /// Calendar month of the period end (1-12)
    pub month_index: u32,
    /// Calendar year of the period end
    pub year_index: i32,
    /// Payout mode the settlement was created with
    pub payment_mode: PaymentMode,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

/// Computes a prorated settlement for one billing period
///
/// The amount is `monthly_rate × day_count / days_in_month(period.end)`,
/// rounded to whole currency units. The divisor is the real calendar length
/// of the month the period ends in, unlike the customer-side 30-day rate.
///
/// No persistence happens here; the caller appends the returned value to
/// the settlement chain.
///
/// # Errors
///
/// Returns `InvalidArgument` if the period starts before the engagement.
pub fn compute_settlement(
    engagement: &Engagement,
    period: DateRange,
) -> Result<Settlement, BillingError> {
    if period.start < engagement.start_date {
        return Err(BillingError::invalid_argument(format!(
            "period start {} precedes engagement start {}",
            period.start, engagement.start_date
        )));
    }

    let day_count = period.day_count();
    let month_days = days_in_month(period.end);

    let amount = engagement
        .monthly_rate
        .multiply(Decimal::from(day_count))
        .divide(Decimal::from(month_days))?
        .round_to_unit();

    Ok(Settlement {
        id: SettlementId::new_v7(),
        engagement_id: engagement.id,
        period,
        day_count,
        amount,
        month_index: period.end.month(),
        year_index: period.end.year(),
        payment_mode: engagement.payment_mode_or_default(),
        created_at: Utc::now(),
    })
}

/// The next billing period for an engagement, if one is due
///
/// The period resumes one day after the last settlement (the billing
/// cursor), or at the engagement's start date for a first settlement, and
/// runs through `bill_through` (the end of the month being billed).
///
/// Returns `None` when the chain already covers `bill_through` — re-running
/// a cycle whose settlement exists is a no-op, which is what makes the
/// scheduler trigger idempotent.
///
/// # Errors
///
/// Returns `InvalidArgument` if `last` belongs to a different engagement.
pub fn next_billing_period(
    engagement: &Engagement,
    last: Option<&Settlement>,
    bill_through: NaiveDate,
) -> Result<Option<DateRange>, BillingError> {
    if let Some(last) = last {
        if last.engagement_id != engagement.id {
            return Err(BillingError::invalid_argument(format!(
                "settlement {} does not belong to engagement {}",
                last.id, engagement.id
            )));
        }
    }

    let start = match last {
        Some(settlement) => settlement.period.end + Duration::days(1),
        None => engagement.start_date,
    };

    if start > bill_through {
        return Ok(None);
    }

    Ok(Some(DateRange::new(start, bill_through)?))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use core_kernel::{Currency, CustomerId, ProviderId};
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn settlement_amounts_are_whole_units(
            rate in 100i64..100_000i64,
            start_day in 1u32..28u32,
        ) {
            let start = NaiveDate::from_ymd_opt(2024, 5, start_day).unwrap();
            let engagement = Engagement::new(
                CustomerId::new(),
                ProviderId::new(),
                start,
                Money::new(Decimal::from(rate), Currency::INR),
            ).unwrap();
            let period = DateRange::new(start, NaiveDate::from_ymd_opt(2024, 5, 31).unwrap()).unwrap();

            let settlement = compute_settlement(&engagement, period).unwrap();
            prop_assert!(settlement.amount.amount().fract().is_zero());
            prop_assert!(settlement.amount.amount() <= Decimal::from(rate));
        }

        #[test]
        fn full_month_always_equals_monthly_rate(
            rate in 100i64..100_000i64,
            month in 1u32..=12u32,
        ) {
            let first = NaiveDate::from_ymd_opt(2024, month, 1).unwrap();
            let engagement = Engagement::new(
                CustomerId::new(),
                ProviderId::new(),
                first,
                Money::new(Decimal::from(rate), Currency::INR),
            ).unwrap();

            let settlement =
                compute_settlement(&engagement, DateRange::month_of(first)).unwrap();
            prop_assert_eq!(settlement.amount.amount(), Decimal::from(rate));
        }
    }
}
