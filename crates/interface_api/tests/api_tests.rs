//! HTTP API tests
//!
//! Drives the full router over the in-memory port adapters, so these tests
//! cover routing, DTO mapping, and error translation without a database.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use core_kernel::Timezone;
use domain_billing::{BillingScheduler, InvoiceService};
use interface_api::{create_router, AppState};
use test_utils::{
    EngagementBuilder, HolidayBuilder, IdFixtures, InMemoryCustomerDirectory,
    InMemoryEngagementLedger, InMemoryInvoiceStore,
};

/// Decimal fields serialize as JSON strings; compare them numerically.
fn amount(value: &Value) -> Decimal {
    value
        .as_str()
        .expect("amount serializes as a string")
        .parse()
        .expect("amount parses as a decimal")
}

struct TestApp {
    server: TestServer,
    directory: Arc<InMemoryCustomerDirectory>,
    ledger: Arc<InMemoryEngagementLedger>,
}

fn test_app() -> TestApp {
    let directory = Arc::new(InMemoryCustomerDirectory::new());
    let store = Arc::new(InMemoryInvoiceStore::new());
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    let timezone = Timezone::default();

    let invoices = Arc::new(InvoiceService::new(
        directory.clone(),
        store,
        timezone,
    ));
    let scheduler = Arc::new(BillingScheduler::new(ledger.clone()));

    let state = AppState {
        invoices,
        ledger: ledger.clone(),
        scheduler,
        timezone,
    };

    TestApp {
        server: TestServer::new(create_router(state)).expect("router builds"),
        directory,
        ledger,
    }
}

#[tokio::test]
async fn health_endpoints_respond() {
    let app = test_app();

    app.server.get("/health").await.assert_status_ok();

    let ready = app.server.get("/health/ready").await;
    ready.assert_status_ok();
    let body: Value = ready.json();
    assert_eq!(body["billing_cycle"]["state"], "idle");
}

#[tokio::test]
async fn invoice_calculation_returns_the_persisted_invoice() {
    let app = test_app();
    app.directory.register_customer(IdFixtures::customer());
    app.directory.add_holiday(HolidayBuilder::new().build()); // Mar 11-15

    let response = app
        .server
        .post("/api/v1/invoices/calculate")
        .json(&json!({
            "customer_id": IdFixtures::customer().as_uuid(),
            "base_amount": "30000",
            "reference_date": "2024-03-15",
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["invoice_month"], "2024-03-01");
    assert_eq!(amount(&body["base_amount"]), dec!(30000));
    assert_eq!(amount(&body["discount_amount"]), dec!(2000));
    assert_eq!(amount(&body["final_amount"]), dec!(28000));
}

#[tokio::test]
async fn unknown_customer_maps_to_404() {
    let app = test_app();

    let response = app
        .server
        .post("/api/v1/invoices/calculate")
        .json(&json!({
            "customer_id": uuid::Uuid::new_v4(),
            "base_amount": "30000",
        }))
        .await;

    response.assert_status_not_found();
    let body: Value = response.json();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn non_positive_amount_maps_to_422() {
    let app = test_app();
    app.directory.register_customer(IdFixtures::customer());

    let response = app
        .server
        .post("/api/v1/invoices/calculate")
        .json(&json!({
            "customer_id": IdFixtures::customer().as_uuid(),
            "base_amount": "0",
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn cycle_trigger_bills_and_reports() {
    let app = test_app();
    let engagement = EngagementBuilder::new().build();
    app.ledger.add_engagement(engagement.clone());

    let response = app
        .server
        .post("/api/v1/billing/run")
        .json(&json!({ "run_date": "2024-02-29" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["outcome"], "completed");
    assert_eq!(body["report"]["billed"].as_array().unwrap().len(), 1);
    assert_eq!(body["report"]["failures"].as_array().unwrap().len(), 0);

    // Re-running the same month skips the already-billed engagement
    let rerun = app
        .server
        .post("/api/v1/billing/run")
        .json(&json!({ "run_date": "2024-02-29" }))
        .await;
    let body: Value = rerun.json();
    assert_eq!(body["report"]["billed"].as_array().unwrap().len(), 0);
    assert_eq!(body["report"]["skipped"].as_array().unwrap().len(), 1);

    let status: Value = app.server.get("/api/v1/billing/status").await.json();
    assert_eq!(status["state"], "completed");
    assert_eq!(status["failures"], 0);
}

#[tokio::test]
async fn settlement_history_is_ordered_by_period_start() {
    let app = test_app();
    let engagement = EngagementBuilder::new().build();
    app.ledger.add_engagement(engagement.clone());

    for run_date in ["2024-02-29", "2024-03-31", "2024-04-30"] {
        app.server
            .post("/api/v1/billing/run")
            .json(&json!({ "run_date": run_date }))
            .await
            .assert_status_ok();
    }

    let response = app
        .server
        .get(&format!(
            "/api/v1/engagements/{}/settlements",
            engagement.id.as_uuid()
        ))
        .await;
    response.assert_status_ok();

    let settlements: Vec<Value> = response.json();
    assert_eq!(settlements.len(), 3);
    assert_eq!(settlements[0]["period_start"], "2024-02-10");
    assert_eq!(settlements[0]["period_end"], "2024-02-29");
    assert_eq!(settlements[1]["period_start"], "2024-03-01");
    assert_eq!(settlements[2]["period_start"], "2024-04-01");

    let by_provider: Vec<Value> = app
        .server
        .get(&format!(
            "/api/v1/providers/{}/settlements",
            engagement.provider_id.as_uuid()
        ))
        .await
        .json();
    assert_eq!(by_provider.len(), 3);
}

#[tokio::test]
async fn empty_history_is_an_empty_list_not_an_error() {
    let app = test_app();
    let engagement = EngagementBuilder::new().build();
    app.ledger.add_engagement(engagement.clone());

    let settlements: Vec<Value> = app
        .server
        .get(&format!(
            "/api/v1/engagements/{}/settlements",
            engagement.id.as_uuid()
        ))
        .await
        .json();
    assert!(settlements.is_empty());
}
