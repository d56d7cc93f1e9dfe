//! Drawer reconciliation arithmetic.
//!
//! Pure, stateless functions: the counting form and the transaction service
//! both call into here so that totals, expected cash, and the
//! Perfect/Over/Short classification are computed the same way everywhere.

use serde::{Deserialize, Serialize};
use shared::{DenominationCount, DrawerStatus};

/// Differences smaller than this are treated as a perfectly balanced
/// drawer. Monetary values are `f64`, so an exact zero comparison would
/// misclassify rounding residue.
pub const DIFFERENCE_TOLERANCE: f64 = 0.01;

/// Total cash value of a denomination count.
///
/// Computed in integer arithmetic over the fixed denomination table and
/// widened to `f64` at the end, so counted cash is always exact.
pub fn cash_total(counts: &DenominationCount) -> f64 {
    let total: i64 = counts
        .iter()
        .map(|(value, count)| i64::from(value) * i64::from(count))
        .sum();
    total as f64
}

/// Cash the drawer should contain at close:
/// opening cash plus revenue minus PromptPay payments.
///
/// Not clamped — a negative result is a legitimate accounting signal
/// (PromptPay exceeded opening plus revenue), not an error.
pub fn expected_cash(opening: f64, revenue: f64, promptpay: f64) -> f64 {
    opening + revenue - promptpay
}

/// Signed difference between counted and expected cash.
pub fn difference(actual: f64, expected: f64) -> f64 {
    actual - expected
}

/// Classify a difference as Perfect, Over, or Short.
///
/// Exactly one variant applies to any difference; statistics, exports, and
/// status badges must all go through this function.
pub fn classify(difference: f64) -> DrawerStatus {
    if difference.abs() < DIFFERENCE_TOLERANCE {
        DrawerStatus::Perfect
    } else if difference > 0.0 {
        DrawerStatus::Over
    } else {
        DrawerStatus::Short
    }
}

/// Everything the summary panel shows for the figures entered so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationSummary {
    pub opening_cash: f64,
    pub closing_cash: f64,
    pub revenue: f64,
    pub promptpay: f64,
    pub expected_cash: f64,
    pub difference: f64,
    pub status: DrawerStatus,
}

/// Compute the full reconciliation summary from raw inputs.
pub fn summarize(
    opening_denominations: &DenominationCount,
    closing_denominations: &DenominationCount,
    revenue: f64,
    promptpay: f64,
) -> ReconciliationSummary {
    let opening_cash = cash_total(opening_denominations);
    let closing_cash = cash_total(closing_denominations);
    let expected = expected_cash(opening_cash, revenue, promptpay);
    let diff = difference(closing_cash, expected);
    ReconciliationSummary {
        opening_cash,
        closing_cash,
        revenue,
        promptpay,
        expected_cash: expected,
        difference: diff,
        status: classify(diff),
    }
}

/// Coerce a raw amount field to a number. Empty or unparsable input counts
/// as zero — the form never rejects it.
pub fn parse_amount(input: &str) -> f64 {
    input.trim().parse::<f64>().unwrap_or(0.0)
}

/// Coerce a raw note/coin count field to a count, same leniency as
/// [`parse_amount`].
pub fn parse_count(input: &str) -> u32 {
    input.trim().parse::<u32>().unwrap_or(0)
}

/// Stored amounts are summed with this guard so a non-finite value
/// contributes nothing instead of poisoning an aggregate.
pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
