//! Aggregate statistics over the filtered reconciled rows.

use rust_decimal::Decimal;

use crate::models::{FinanceState, ReconciledRow};

/// Summary statistics for one filtered row set.
///
/// The three count groups each partition the row set: assessed/not-assessed,
/// the finance states, and balanced/unbalanced all sum to `total_rows`.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    pub total_rows: usize,
    pub total_kilograms: Decimal,
    pub total_bags: i64,
    pub total_paid: Decimal,
    pub total_confirmed_paid: Decimal,
    pub assessed_count: usize,
    pub not_assessed_count: usize,
    pub finance_missing_count: usize,
    pub finance_pending_count: usize,
    pub finance_confirmed_count: usize,
    pub balanced_count: usize,
    pub unbalanced_count: usize,
    /// Blend of assessment coverage and finance coverage, 0-100.
    pub flow_health: u8,
}

pub fn summarize(rows: &[ReconciledRow]) -> ReportSummary {
    let total_rows = rows.len();

    let mut total_kilograms = Decimal::ZERO;
    let mut total_bags: i64 = 0;
    let mut total_paid = Decimal::ZERO;
    let mut total_confirmed_paid = Decimal::ZERO;
    let mut assessed_count = 0;
    let mut finance_missing_count = 0;
    let mut finance_pending_count = 0;
    let mut finance_confirmed_count = 0;
    let mut balanced_count = 0;

    for row in rows {
        total_kilograms += row.record.kilograms;
        total_bags += i64::from(row.record.bags);
        total_paid += row.paid_total;
        total_confirmed_paid += row.confirmed_paid;
        if row.has_assessment {
            assessed_count += 1;
        }
        match row.finance_state {
            FinanceState::Missing => finance_missing_count += 1,
            FinanceState::Pending => finance_pending_count += 1,
            FinanceState::Confirmed => finance_confirmed_count += 1,
        }
        if row.is_balanced {
            balanced_count += 1;
        }
    }

    // Denominator floored at 1 so an empty set yields 0, not NaN.
    let denominator = total_rows.max(1) as f64;
    let assessment_coverage = assessed_count as f64 / denominator;
    let finance_coverage = (total_rows - finance_missing_count) as f64 / denominator;
    let flow_health = ((assessment_coverage + finance_coverage) / 2.0 * 100.0).round() as u8;

    ReportSummary {
        total_rows,
        total_kilograms,
        total_bags,
        total_paid,
        total_confirmed_paid,
        assessed_count,
        not_assessed_count: total_rows - assessed_count,
        finance_missing_count,
        finance_pending_count,
        finance_confirmed_count,
        balanced_count,
        unbalanced_count: total_rows - balanced_count,
        flow_health,
    }
}

/// Display percentage; a zero denominator renders as the literal `0%`.
pub fn percent(numerator: usize, denominator: usize) -> String {
    if denominator == 0 {
        return "0%".to_string();
    }
    format!(
        "{}%",
        ((numerator as f64 / denominator as f64) * 100.0).round() as i64
    )
}
