//! Vacation discount policy
//!
//! Maps a customer's vacation-day count for the invoice month onto a
//! discount tier. The tiers are marketplace policy, inclusive at both
//! boundaries.

use rust_decimal_macros::dec;

use core_kernel::Rate;

/// Discount tier for a vacation-day count
///
/// | days   | discount |
/// |--------|----------|
/// | 0      | 0%       |
/// | 1-7    | 40%      |
/// | 8-15   | 50%      |
/// | >15    | 60%      |
pub fn vacation_discount(vacation_days: u32) -> Rate {
    match vacation_days {
        0 => Rate::zero(),
        1..=7 => Rate::from_percentage(dec!(40)),
        8..=15 => Rate::from_percentage(dec!(50)),
        _ => Rate::from_percentage(dec!(60)),
    }
}
