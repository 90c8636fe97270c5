//! Invoice service integration tests
//!
//! Runs the invoice calculation entry point against the in-memory
//! directory and invoice store.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{CouponId, Currency, CustomerId, Money, Timezone};
use domain_billing::{BillingError, CalculateInvoiceRequest, InvoiceService};
use test_utils::{
    DateFixtures, HolidayBuilder, IdFixtures, InMemoryCouponService, InMemoryCustomerDirectory,
    InMemoryInvoiceStore, MoneyFixtures,
};

fn inr(amount: rust_decimal::Decimal) -> Money {
    Money::new(amount, Currency::INR)
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

struct Harness {
    directory: Arc<InMemoryCustomerDirectory>,
    store: Arc<InMemoryInvoiceStore>,
    coupons: Arc<InMemoryCouponService>,
    service: InvoiceService,
}

fn harness() -> Harness {
    let directory = Arc::new(InMemoryCustomerDirectory::new());
    let store = Arc::new(InMemoryInvoiceStore::new());
    let coupons = Arc::new(InMemoryCouponService::new());
    let service = InvoiceService::new(
        directory.clone(),
        store.clone(),
        Timezone::default(),
    )
    .with_coupons(coupons.clone());

    directory.register_customer(IdFixtures::customer());
    Harness {
        directory,
        store,
        coupons,
        service,
    }
}

fn request(base: Money) -> CalculateInvoiceRequest {
    CalculateInvoiceRequest {
        customer_id: IdFixtures::customer(),
        base_amount: base,
        reference_date: Some(DateFixtures::mid_march()),
        coupon_id: None,
    }
}

#[tokio::test]
async fn five_vacation_days_earn_a_forty_percent_discount() {
    let h = harness();
    h.directory.add_holiday(HolidayBuilder::new().build()); // Mar 11-15

    let invoice = h.service.calculate_invoice(request(MoneyFixtures::base_30000())).await.unwrap();

    assert_eq!(invoice.invoice_month, DateFixtures::march_start());
    assert_eq!(invoice.base_amount.amount(), dec!(30000));
    assert_eq!(invoice.discount_amount.amount(), dec!(2000));
    assert_eq!(invoice.final_amount.amount(), dec!(28000));
}

#[tokio::test]
async fn ten_vacation_days_earn_a_fifty_percent_discount() {
    let h = harness();
    h.directory.add_holiday(
        HolidayBuilder::new()
            .spanning(d(2024, 3, 6), d(2024, 3, 15))
            .build(),
    );

    let invoice = h.service.calculate_invoice(request(MoneyFixtures::base_30000())).await.unwrap();

    assert_eq!(invoice.discount_amount.amount(), dec!(5000));
    assert_eq!(invoice.final_amount.amount(), dec!(25000));
}

#[tokio::test]
async fn twenty_vacation_days_earn_a_sixty_percent_discount() {
    let h = harness();
    h.directory.add_holiday(
        HolidayBuilder::new()
            .spanning(d(2024, 3, 5), d(2024, 3, 24))
            .build(),
    );

    let invoice = h.service.calculate_invoice(request(MoneyFixtures::base_30000())).await.unwrap();

    assert_eq!(invoice.discount_amount.amount(), dec!(12000));
    assert_eq!(invoice.final_amount.amount(), dec!(18000));
}

#[tokio::test]
async fn inactive_and_out_of_month_holidays_do_not_discount() {
    let h = harness();
    h.directory.add_holiday(HolidayBuilder::new().inactive().build());
    h.directory.add_holiday(
        HolidayBuilder::new()
            .spanning(d(2024, 4, 1), d(2024, 4, 10))
            .build(),
    );

    let invoice = h.service.calculate_invoice(request(MoneyFixtures::base_30000())).await.unwrap();

    assert!(invoice.discount_amount.is_zero());
    assert_eq!(invoice.final_amount.amount(), dec!(30000));
}

#[tokio::test]
async fn unknown_customer_is_a_not_found_error() {
    let h = harness();
    let mut req = request(MoneyFixtures::base_30000());
    req.customer_id = CustomerId::new();

    let result = h.service.calculate_invoice(req).await;
    assert!(matches!(result, Err(BillingError::NotFound(_))));
    assert_eq!(h.store.row_count(), 0);
}

#[tokio::test]
async fn non_positive_base_amount_is_rejected_before_any_write() {
    let h = harness();

    let result = h.service.calculate_invoice(request(inr(dec!(0)))).await;
    assert!(matches!(result, Err(BillingError::InvalidArgument(_))));

    let result = h.service.calculate_invoice(request(inr(dec!(-50)))).await;
    assert!(matches!(result, Err(BillingError::InvalidArgument(_))));

    assert_eq!(h.store.row_count(), 0);
}

#[tokio::test]
async fn recomputation_overwrites_the_single_monthly_row() {
    let h = harness();
    h.directory.add_holiday(HolidayBuilder::new().build());

    let first = h.service.calculate_invoice(request(MoneyFixtures::base_30000())).await.unwrap();
    let second = h.service.calculate_invoice(request(inr(dec!(24000)))).await.unwrap();

    // One row, same identifier, latest amounts
    assert_eq!(h.store.row_count(), 1);
    assert_eq!(second.id, first.id);
    assert_eq!(second.base_amount.amount(), dec!(24000));
    // daily rate 800, 5 vacation days at 40%
    assert_eq!(second.discount_amount.amount(), dec!(1600));
    assert_eq!(second.final_amount.amount(), dec!(22400));
}

#[tokio::test]
async fn different_months_get_separate_invoices() {
    let h = harness();

    let mut march = request(MoneyFixtures::base_30000());
    march.reference_date = Some(DateFixtures::mid_march());
    h.service.calculate_invoice(march).await.unwrap();

    let mut april = request(MoneyFixtures::base_30000());
    april.reference_date = Some(d(2024, 4, 2));
    let invoice = h.service.calculate_invoice(april).await.unwrap();

    assert_eq!(h.store.row_count(), 2);
    assert_eq!(invoice.invoice_month, d(2024, 4, 1));
}

#[tokio::test]
async fn coupon_discount_applies_on_top_of_vacation_discount() {
    let h = harness();
    h.directory.add_holiday(HolidayBuilder::new().build());

    let coupon = CouponId::new();
    h.coupons.register_coupon(coupon, MoneyFixtures::coupon_500());

    let mut req = request(MoneyFixtures::base_30000());
    req.coupon_id = Some(coupon);
    let invoice = h.service.calculate_invoice(req).await.unwrap();

    assert_eq!(invoice.discount_amount.amount(), dec!(2000));
    assert_eq!(invoice.coupon_discount.unwrap().amount(), dec!(500));
    assert_eq!(invoice.final_amount.amount(), dec!(27500));
    assert_eq!(invoice.coupon_id, Some(coupon));
}

#[tokio::test]
async fn unknown_coupon_fails_the_calculation() {
    let h = harness();

    let mut req = request(MoneyFixtures::base_30000());
    req.coupon_id = Some(CouponId::new());

    let result = h.service.calculate_invoice(req).await;
    assert!(matches!(result, Err(BillingError::NotFound(_))));
    assert_eq!(h.store.row_count(), 0);
}

#[tokio::test]
async fn coupon_without_collaborator_is_invalid() {
    let directory = Arc::new(InMemoryCustomerDirectory::new());
    let store = Arc::new(InMemoryInvoiceStore::new());
    let service = InvoiceService::new(directory.clone(), store, Timezone::default());
    directory.register_customer(IdFixtures::customer());

    let mut req = request(MoneyFixtures::base_30000());
    req.coupon_id = Some(CouponId::new());

    let result = service.calculate_invoice(req).await;
    assert!(matches!(result, Err(BillingError::InvalidArgument(_))));
}
