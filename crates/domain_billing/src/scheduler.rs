//! The billing scheduler
//!
//! Once per calendar month the scheduler advances every active engagement's
//! settlement chain by one period. Engagements are processed independently:
//! a failure is logged and recorded in the cycle report, never allowed to
//! abort the rest of the batch. Failed engagements are retried naturally on
//! the next cycle because their billing cursor has not advanced.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use core_kernel::{month_end, EngagementId, SettlementId};

use crate::error::BillingError;
use crate::ports::EngagementLedger;

/// Where the scheduler currently is in its cycle
///
/// A cycle always runs to completion once triggered; there is no cancelled
/// or paused state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum CycleState {
    /// No cycle has run yet, or the last one finished long ago
    Idle,
    /// A cycle is processing engagements right now
    Running,
    /// The last cycle finished; `failures` engagements need the next cycle
    Completed { failures: usize },
}

/// One engagement the cycle could not bill
#[derive(Debug, Clone, Serialize)]
pub struct CycleFailure {
    pub engagement_id: EngagementId,
    pub reason: String,
}

/// The outcome of one scheduler cycle
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    /// Civil date the cycle was triggered for
    pub run_date: NaiveDate,
    /// Last day of the month the cycle billed through
    pub billed_through: NaiveDate,
    /// Settlements created this cycle, one per advanced engagement
    pub billed: Vec<(EngagementId, SettlementId)>,
    /// Engagements whose chain already covered the month end
    pub skipped: Vec<EngagementId>,
    /// Engagements that failed; their cursor has not moved
    pub failures: Vec<CycleFailure>,
}

impl CycleReport {
    /// True if every engagement in the batch was billed or skipped
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// What happened when a trigger fired
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "report")]
pub enum CycleOutcome {
    /// Another cycle was still running; this trigger did nothing
    Skipped,
    /// The cycle ran to completion (possibly with per-engagement failures)
    Completed(CycleReport),
}

/// Advances every active engagement's settlement chain once per cycle
///
/// The scheduler itself holds no billing state: the cursor lives in the
/// settlement chain and is read inside the same transaction that writes
/// the next settlement, so re-triggering a finished cycle is a no-op.
pub struct BillingScheduler {
    ledger: Arc<dyn EngagementLedger>,
    running: Mutex<()>,
    state: RwLock<CycleState>,
}

impl BillingScheduler {
    /// Creates a scheduler over an engagement ledger
    pub fn new(ledger: Arc<dyn EngagementLedger>) -> Self {
        Self {
            ledger,
            running: Mutex::new(()),
            state: RwLock::new(CycleState::Idle),
        }
    }

    /// The current cycle state
    pub async fn state(&self) -> CycleState {
        *self.state.read().await
    }

    /// Runs one billing cycle for the month containing `today`
    ///
    /// Every active engagement is billed through the last day of that
    /// month. Cycles are mutually exclusive: a trigger that fires while a
    /// cycle is still running returns [`CycleOutcome::Skipped`] instead of
    /// queueing a concurrent run.
    ///
    /// # Errors
    ///
    /// Returns an error only when the engagement list itself cannot be
    /// read. Per-engagement failures are contained in the report.
    pub async fn run_cycle(&self, today: NaiveDate) -> Result<CycleOutcome, BillingError> {
        let _guard = match self.running.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!(%today, "billing cycle already running, trigger skipped");
                return Ok(CycleOutcome::Skipped);
            }
        };

        *self.state.write().await = CycleState::Running;
        let billed_through = month_end(today);
        tracing::info!(%today, %billed_through, "billing cycle started");

        let engagements = match self.ledger.list_active_engagements().await {
            Ok(engagements) => engagements,
            Err(err) => {
                *self.state.write().await = CycleState::Idle;
                return Err(err);
            }
        };

        let mut report = CycleReport {
            run_date: today,
            billed_through,
            billed: Vec::new(),
            skipped: Vec::new(),
            failures: Vec::new(),
        };

        for engagement in &engagements {
            match self.ledger.extend_chain(engagement, billed_through).await {
                Ok(Some(settlement)) => {
                    tracing::debug!(
                        engagement = %engagement.id,
                        settlement = %settlement.id,
                        period_start = %settlement.period.start,
                        period_end = %settlement.period.end,
                        amount = %settlement.amount,
                        "settlement created"
                    );
                    report.billed.push((engagement.id, settlement.id));
                }
                Ok(None) => {
                    report.skipped.push(engagement.id);
                }
                Err(err) => {
                    tracing::error!(
                        engagement = %engagement.id,
                        error = %err,
                        "engagement billing failed, continuing cycle"
                    );
                    report.failures.push(CycleFailure {
                        engagement_id: engagement.id,
                        reason: err.to_string(),
                    });
                }
            }
        }

        *self.state.write().await = CycleState::Completed {
            failures: report.failures.len(),
        };
        tracing::info!(
            billed = report.billed.len(),
            skipped = report.skipped.len(),
            failures = report.failures.len(),
            "billing cycle completed"
        );

        Ok(CycleOutcome::Completed(report))
    }
}
