//! CSV exports: full row detail plus a summary audit trail.
//!
//! Filenames embed the active date range and a colon-free UTC timestamp so
//! repeated exports never collide.

use std::path::Path;

use chrono::{DateTime, Utc};
use csv::Writer;
use service_core::error::AppError;
use tracing::info;

use crate::models::ReconciledRow;
use crate::services::range::DateRange;
use crate::services::summary::{percent, ReportSummary};

/// Stable column order for the full export.
pub const DETAIL_COLUMNS: [&str; 18] = [
    "date",
    "supplier",
    "coffee_type",
    "status",
    "kilograms",
    "bags",
    "batch_number",
    "assessment_status",
    "assessment_date",
    "assessed_by",
    "suggested_price",
    "final_price",
    "finance_state",
    "paid_total",
    "confirmed_paid",
    "transaction_count",
    "balance",
    "record_id",
];

pub fn export_file_name(prefix: &str, range: DateRange, generated_at: DateTime<Utc>) -> String {
    format!(
        "{}_{}_{}_{}.csv",
        prefix,
        range.from,
        range.to,
        generated_at.format("%Y-%m-%dT%H-%M-%SZ")
    )
}

/// Write one line per filtered row, in the fixed column order.
///
/// An empty row set is a Validation error; nothing is written.
pub fn write_detail_csv(path: &Path, rows: &[ReconciledRow]) -> Result<(), AppError> {
    if rows.is_empty() {
        return Err(AppError::Validation(
            "nothing to export: the filtered row set is empty".to_string(),
        ));
    }

    let mut writer = Writer::from_path(path).map_err(csv_error)?;
    writer.write_record(DETAIL_COLUMNS).map_err(csv_error)?;
    for row in rows {
        writer.write_record(detail_fields(row)).map_err(csv_error)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "detail export written");
    Ok(())
}

fn detail_fields(row: &ReconciledRow) -> [String; 18] {
    let assessment = row.assessment.as_ref();
    [
        row.record.date.to_string(),
        row.record.supplier_name.clone(),
        row.record.coffee_type.clone(),
        row.record.status.clone(),
        row.record.kilograms.to_string(),
        row.record.bags.to_string(),
        row.record.batch_number.clone(),
        assessment.map(|a| a.status.clone()).unwrap_or_default(),
        assessment.map(|a| a.date_assessed.clone()).unwrap_or_default(),
        assessment.map(|a| a.assessed_by.clone()).unwrap_or_default(),
        assessment
            .map(|a| a.suggested_price.to_string())
            .unwrap_or_default(),
        assessment
            .and_then(|a| a.final_price)
            .map(|p| p.to_string())
            .unwrap_or_default(),
        row.finance_state.as_str().to_string(),
        row.paid_total.to_string(),
        row.confirmed_paid.to_string(),
        row.transactions.len().to_string(),
        row.balance_label().to_string(),
        row.record.id.clone(),
    ]
}

/// Write the aggregate statistics as label/value/detail triples, together
/// with the active filter description and the matching rules in force, as an
/// audit trail accompanying the detail export.
pub fn write_summary_csv(
    path: &Path,
    summary: &ReportSummary,
    filter_description: &str,
    range: DateRange,
    finance_types: &[String],
) -> Result<(), AppError> {
    let total = summary.total_rows;
    let mut writer = Writer::from_path(path).map_err(csv_error)?;
    writer
        .write_record(["label", "value", "detail"])
        .map_err(csv_error)?;

    let lines: Vec<[String; 3]> = vec![
        [
            "date_range".to_string(),
            format!("{}..{}", range.from, range.to),
            "inclusive".to_string(),
        ],
        ["rows".to_string(), total.to_string(), String::new()],
        [
            "total_kilograms".to_string(),
            summary.total_kilograms.to_string(),
            String::new(),
        ],
        [
            "total_bags".to_string(),
            summary.total_bags.to_string(),
            String::new(),
        ],
        [
            "total_paid".to_string(),
            summary.total_paid.to_string(),
            "all matched transactions".to_string(),
        ],
        [
            "total_confirmed_paid".to_string(),
            summary.total_confirmed_paid.to_string(),
            "confirmed transactions only".to_string(),
        ],
        [
            "assessed".to_string(),
            summary.assessed_count.to_string(),
            percent(summary.assessed_count, total),
        ],
        [
            "not_assessed".to_string(),
            summary.not_assessed_count.to_string(),
            percent(summary.not_assessed_count, total),
        ],
        [
            "finance_missing".to_string(),
            summary.finance_missing_count.to_string(),
            percent(summary.finance_missing_count, total),
        ],
        [
            "finance_pending".to_string(),
            summary.finance_pending_count.to_string(),
            percent(summary.finance_pending_count, total),
        ],
        [
            "finance_confirmed".to_string(),
            summary.finance_confirmed_count.to_string(),
            percent(summary.finance_confirmed_count, total),
        ],
        [
            "balanced".to_string(),
            summary.balanced_count.to_string(),
            percent(summary.balanced_count, total),
        ],
        [
            "unbalanced".to_string(),
            summary.unbalanced_count.to_string(),
            percent(summary.unbalanced_count, total),
        ],
        [
            "flow_health".to_string(),
            summary.flow_health.to_string(),
            "mean of assessment and finance coverage".to_string(),
        ],
        [
            "filters".to_string(),
            filter_description.to_string(),
            String::new(),
        ],
        [
            "finance_types".to_string(),
            finance_types.join(","),
            "transaction types counted as purchase payments".to_string(),
        ],
        [
            "matching".to_string(),
            "record id first, batch number fallback".to_string(),
            "most recent assessment per key; payments matched by reference".to_string(),
        ],
    ];

    for line in &lines {
        writer.write_record(line).map_err(csv_error)?;
    }
    writer.flush()?;

    info!(path = %path.display(), "summary export written");
    Ok(())
}

fn csv_error(err: csv::Error) -> AppError {
    AppError::Unknown(anyhow::Error::new(err))
}
