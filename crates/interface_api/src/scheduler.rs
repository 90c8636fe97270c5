//! Scheduler driver
//!
//! A tokio task that fires the billing cycle at the end of each calendar
//! month in the configured billing timezone. The cycle itself is idempotent
//! (it resumes from each engagement's cursor), so a restart that causes an
//! extra trigger is harmless, and overlapping triggers are refused by the
//! scheduler's own mutual exclusion.

use std::sync::Arc;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;

use core_kernel::{month_end, Timezone};
use domain_billing::{BillingScheduler, CycleOutcome};

/// Wall-clock time on the month's last day the cycle triggers at
const TRIGGER_HOUR: u32 = 23;
const TRIGGER_MINUTE: u32 = 55;

/// Spawns the monthly billing trigger task
///
/// The task sleeps until the next month-end trigger instant, runs one
/// cycle, and loops. It runs for the lifetime of the process.
pub fn spawn_monthly_trigger(
    scheduler: Arc<BillingScheduler>,
    timezone: Timezone,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let now = Utc::now();
            let trigger_at = next_trigger(now, timezone.0);
            let wait = (trigger_at - now)
                .to_std()
                .unwrap_or_else(|_| std::time::Duration::from_secs(0));

            tracing::info!(
                trigger_at = %trigger_at,
                wait_secs = wait.as_secs(),
                "waiting for next billing trigger"
            );
            tokio::time::sleep(wait).await;

            let run_date = timezone.today();
            match scheduler.run_cycle(run_date).await {
                Ok(CycleOutcome::Completed(report)) => {
                    tracing::info!(
                        %run_date,
                        billed = report.billed.len(),
                        failures = report.failures.len(),
                        "scheduled billing cycle finished"
                    );
                }
                Ok(CycleOutcome::Skipped) => {
                    tracing::warn!(%run_date, "scheduled billing cycle skipped");
                }
                Err(err) => {
                    tracing::error!(%run_date, error = %err, "scheduled billing cycle failed");
                }
            }

            // Step past the trigger instant so the next loop iteration
            // computes the following month.
            tokio::time::sleep(std::time::Duration::from_secs(600)).await;
        }
    })
}

/// The next month-end trigger instant strictly after `now`
fn next_trigger(now: DateTime<Utc>, tz: Tz) -> DateTime<Utc> {
    let today = now.with_timezone(&tz).date_naive();
    let this_month = trigger_instant(tz, month_end(today));
    if this_month > now {
        this_month
    } else {
        let next_month_day = month_end(today) + Duration::days(1);
        trigger_instant(tz, month_end(next_month_day))
    }
}

/// The trigger instant on a given day, resolved in the billing timezone
fn trigger_instant(tz: Tz, day: NaiveDate) -> DateTime<Utc> {
    let naive = day
        .and_hms_opt(TRIGGER_HOUR, TRIGGER_MINUTE, 0)
        .expect("trigger wall-clock time is valid");

    match naive.and_local_timezone(tz) {
        LocalResult::Single(instant) => instant.with_timezone(&Utc),
        // On a DST fold take the earlier occurrence; on a gap fall back
        // to treating the wall-clock time as UTC.
        LocalResult::Ambiguous(earlier, _) => earlier.with_timezone(&Utc),
        LocalResult::None => Utc.from_utc_datetime(&naive),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Kolkata;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_trigger_falls_on_current_month_end() {
        let now = utc(2024, 3, 10, 12, 0);
        let trigger = next_trigger(now, Kolkata);

        // 2024-03-31 23:55 IST == 18:25 UTC
        assert_eq!(trigger, utc(2024, 3, 31, 18, 25));
    }

    #[test]
    fn test_past_trigger_rolls_to_next_month() {
        // Already past the March trigger instant
        let now = utc(2024, 3, 31, 20, 0);
        let trigger = next_trigger(now, Kolkata);

        assert_eq!(trigger, utc(2024, 4, 30, 18, 25));
    }

    #[test]
    fn test_trigger_is_always_in_the_future() {
        let now = utc(2024, 12, 31, 18, 25);
        let trigger = next_trigger(now, Kolkata);
        assert!(trigger > now);
        assert_eq!(trigger, utc(2025, 1, 31, 18, 25));
    }
}
