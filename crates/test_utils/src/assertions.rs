//! Custom assertion helpers for domain invariants

use domain_billing::Settlement;
use rust_decimal::Decimal;

/// Asserts that a settlement chain is contiguous and non-overlapping
///
/// Verifies `period_start(n+1) == period_end(n) + 1 day` for every
/// consecutive pair, and that no two periods overlap.
///
/// # Panics
///
/// Panics with a descriptive message on the first violated pair.
pub fn assert_contiguous_chain(chain: &[Settlement]) {
    for (index, pair) in chain.windows(2).enumerate() {
        assert!(
            pair[0].period.abuts(&pair[1].period),
            "settlement chain broken between #{} ({} .. {}) and #{} ({} .. {})",
            index,
            pair[0].period.start,
            pair[0].period.end,
            index + 1,
            pair[1].period.start,
            pair[1].period.end,
        );
        assert!(
            !pair[0].period.overlaps(&pair[1].period),
            "settlement periods overlap between #{} and #{}",
            index,
            index + 1,
        );
    }
}

/// Asserts a settlement's amount down to the decimal
///
/// # Panics
///
/// Panics if the amount differs, printing the full settlement for context.
pub fn assert_settlement_amount(settlement: &Settlement, expected: Decimal) {
    assert_eq!(
        settlement.amount.amount(),
        expected,
        "unexpected settlement amount for period {} .. {}: {:?}",
        settlement.period.start,
        settlement.period.end,
        settlement,
    );
}
