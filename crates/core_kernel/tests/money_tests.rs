//! Black-box tests for the money module

use core_kernel::{Currency, Money, MoneyError, Rate};
use rust_decimal_macros::dec;

#[test]
fn money_stores_four_internal_decimal_places() {
    let m = Money::new(dec!(33.33333), Currency::INR);
    assert_eq!(m.amount(), dec!(33.3333));
}

#[test]
fn money_rounds_to_currency_precision() {
    let m = Money::new(dec!(99.999), Currency::INR);
    assert_eq!(m.round_to_currency().amount(), dec!(100.00));
}

#[test]
fn settlement_rounding_matches_half_away_from_zero() {
    // 3000 * 20 / 29 = 2068.9655...
    let rate = Money::new(dec!(3000), Currency::INR);
    let prorated = rate.multiply(dec!(20)).divide(dec!(29)).unwrap();
    assert_eq!(prorated.round_to_unit().amount(), dec!(2069));
}

#[test]
fn division_by_zero_is_rejected() {
    let m = Money::new(dec!(100), Currency::INR);
    assert_eq!(m.divide(dec!(0)), Err(MoneyError::DivisionByZero));
}

#[test]
fn mixed_currency_subtraction_fails() {
    let inr = Money::new(dec!(10), Currency::INR);
    let eur = Money::new(dec!(10), Currency::EUR);
    assert!(matches!(
        inr.checked_sub(&eur),
        Err(MoneyError::CurrencyMismatch(_, _))
    ));
}

#[test]
fn rate_from_percentage_roundtrips() {
    let rate = Rate::from_percentage(dec!(50));
    assert_eq!(rate.as_decimal(), dec!(0.5));
    assert_eq!(rate.as_percentage(), dec!(50));
}

#[test]
fn zero_rate_applies_to_nothing() {
    let rate = Rate::zero();
    let base = Money::new(dec!(30000), Currency::INR);
    assert!(rate.apply(&base).is_zero());
}

#[test]
fn default_currency_is_inr() {
    assert_eq!(Currency::default(), Currency::INR);
    assert_eq!(Money::zero(Currency::default()).currency().code(), "INR");
}

#[test]
fn display_uses_currency_symbol() {
    let m = Money::new(dec!(1234.5), Currency::INR);
    assert_eq!(m.to_string(), "₹ 1234.50");
}
