//! Black-box tests for kernel error types

use core_kernel::{CoreError, Currency, Money, MoneyError, TemporalError};
use rust_decimal_macros::dec;

#[test]
fn money_errors_convert_into_core_errors() {
    let inr = Money::new(dec!(10), Currency::INR);
    let usd = Money::new(dec!(10), Currency::USD);

    let err: CoreError = inr.checked_add(&usd).unwrap_err().into();
    assert!(matches!(err, CoreError::Money(MoneyError::CurrencyMismatch(_, _))));
}

#[test]
fn temporal_errors_convert_into_core_errors() {
    let source = TemporalError::OutOfRange("no such date".to_string());
    let err: CoreError = source.into();
    assert!(matches!(err, CoreError::Temporal(_)));
    assert!(err.to_string().contains("no such date"));
}

#[test]
fn helper_constructors_build_the_right_variants() {
    assert!(matches!(
        CoreError::validation("bad input"),
        CoreError::Validation(_)
    ));
    assert!(matches!(
        CoreError::not_found("customer missing"),
        CoreError::NotFound(_)
    ));
}
