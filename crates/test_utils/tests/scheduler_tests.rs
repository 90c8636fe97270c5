//! Billing scheduler integration tests
//!
//! Runs the scheduler against the in-memory engagement ledger to verify
//! failure isolation, idempotent triggers, and chain contiguity across
//! consecutive cycles.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{CustomerId, ProviderId};
use domain_billing::{BillingScheduler, CycleOutcome, CycleState, EngagementLedger};
use test_utils::{
    assert_contiguous_chain, assert_settlement_amount, DateFixtures, EngagementBuilder,
    InMemoryEngagementLedger,
};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn completed(outcome: CycleOutcome) -> domain_billing::CycleReport {
    match outcome {
        CycleOutcome::Completed(report) => report,
        CycleOutcome::Skipped => panic!("cycle was unexpectedly skipped"),
    }
}

#[tokio::test]
async fn first_cycle_bills_every_active_engagement() {
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    for _ in 0..3 {
        ledger.add_engagement(
            EngagementBuilder::new()
                .with_customer(CustomerId::new())
                .with_provider(ProviderId::new())
                .build(),
        );
    }

    let scheduler = BillingScheduler::new(ledger.clone());
    let report = completed(scheduler.run_cycle(DateFixtures::leap_feb_end()).await.unwrap());

    assert_eq!(report.billed.len(), 3);
    assert!(report.skipped.is_empty());
    assert!(report.is_clean());

    for (engagement_id, _) in &report.billed {
        let chain = ledger.settlements_for_engagement(*engagement_id).await.unwrap();
        assert_eq!(chain.len(), 1);
        // 20 of 29 February days at rate 3000
        assert_settlement_amount(&chain[0], dec!(2069));
    }
}

#[tokio::test]
async fn one_failing_engagement_does_not_disturb_the_rest() {
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    let healthy_a = EngagementBuilder::new().with_customer(CustomerId::new()).build();
    let broken = EngagementBuilder::new().with_customer(CustomerId::new()).build();
    let healthy_b = EngagementBuilder::new().with_customer(CustomerId::new()).build();

    ledger.add_engagement(healthy_a.clone());
    ledger.add_engagement(broken.clone());
    ledger.add_engagement(healthy_b.clone());
    ledger.fail_engagement(broken.id);

    let scheduler = BillingScheduler::new(ledger.clone());
    let report = completed(scheduler.run_cycle(DateFixtures::leap_feb_end()).await.unwrap());

    // Both healthy engagements billed, the broken one recorded and skipped over
    assert_eq!(report.billed.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].engagement_id, broken.id);
    assert_eq!(ledger.settlement_count(healthy_a.id), 1);
    assert_eq!(ledger.settlement_count(healthy_b.id), 1);
    assert_eq!(ledger.settlement_count(broken.id), 0);

    assert_eq!(
        scheduler.state().await,
        CycleState::Completed { failures: 1 }
    );
}

#[tokio::test]
async fn a_failed_engagement_catches_up_on_the_next_cycle() {
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    let engagement = EngagementBuilder::new().build();
    ledger.add_engagement(engagement.clone());
    ledger.fail_engagement(engagement.id);

    let scheduler = BillingScheduler::new(ledger.clone());
    let report = completed(scheduler.run_cycle(DateFixtures::leap_feb_end()).await.unwrap());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(ledger.settlement_count(engagement.id), 0);

    // The cursor never advanced, so the March cycle bills from the
    // engagement start through the March month end in one period.
    ledger.heal_engagement(engagement.id);
    let report = completed(scheduler.run_cycle(DateFixtures::march_end()).await.unwrap());

    assert!(report.is_clean());
    let chain = ledger.settlements_for_engagement(engagement.id).await.unwrap();
    assert_eq!(chain.len(), 1);
    assert_eq!(chain[0].period.start, DateFixtures::leap_feb_start());
    assert_eq!(chain[0].period.end, DateFixtures::march_end());
}

#[tokio::test]
async fn retriggering_a_completed_cycle_creates_no_duplicates() {
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    let engagement = EngagementBuilder::new().build();
    ledger.add_engagement(engagement.clone());

    let scheduler = BillingScheduler::new(ledger.clone());

    let first = completed(scheduler.run_cycle(DateFixtures::leap_feb_end()).await.unwrap());
    assert_eq!(first.billed.len(), 1);

    // Same month, cursor unchanged since the settlement exists
    let second = completed(scheduler.run_cycle(DateFixtures::leap_feb_end()).await.unwrap());
    assert!(second.billed.is_empty());
    assert_eq!(second.skipped, vec![engagement.id]);
    assert_eq!(ledger.settlement_count(engagement.id), 1);
}

#[tokio::test]
async fn consecutive_cycles_build_a_contiguous_chain() {
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    let engagement = EngagementBuilder::new().build();
    ledger.add_engagement(engagement.clone());

    let scheduler = BillingScheduler::new(ledger.clone());
    for trigger in [
        DateFixtures::leap_feb_end(),
        DateFixtures::march_end(),
        d(2024, 4, 30),
        d(2024, 5, 31),
    ] {
        completed(scheduler.run_cycle(trigger).await.unwrap());
    }

    let chain = ledger.settlements_for_engagement(engagement.id).await.unwrap();
    assert_eq!(chain.len(), 4);
    assert_eq!(chain[0].period.start, engagement.start_date);
    assert_contiguous_chain(&chain);

    // Partial February, then three full months at the monthly rate
    assert_settlement_amount(&chain[0], dec!(2069));
    for settlement in &chain[1..] {
        assert_settlement_amount(settlement, dec!(3000));
    }
}

#[tokio::test]
async fn terminated_engagements_are_not_billed() {
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    let active = EngagementBuilder::new().with_customer(CustomerId::new()).build();
    let terminated = EngagementBuilder::new()
        .with_customer(CustomerId::new())
        .terminated_on(DateFixtures::leap_feb_end())
        .build();

    ledger.add_engagement(active.clone());
    ledger.add_engagement(terminated.clone());

    let scheduler = BillingScheduler::new(ledger.clone());
    let report = completed(scheduler.run_cycle(DateFixtures::march_end()).await.unwrap());

    assert_eq!(report.billed.len(), 1);
    assert_eq!(report.billed[0].0, active.id);
    assert_eq!(ledger.settlement_count(terminated.id), 0);
}

#[tokio::test]
async fn scheduler_state_reflects_the_last_cycle() {
    let ledger = Arc::new(InMemoryEngagementLedger::new());
    let scheduler = BillingScheduler::new(ledger);

    assert_eq!(scheduler.state().await, CycleState::Idle);

    completed(scheduler.run_cycle(DateFixtures::march_end()).await.unwrap());
    assert_eq!(scheduler.state().await, CycleState::Completed { failures: 0 });
}
