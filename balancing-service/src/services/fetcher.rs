//! Multi-source fetch with chunked IN-list lookups.
//!
//! Retrieves the purchase records for a resolved date range, then the
//! assessments and finance transactions referencing them. Key lists are split
//! into fixed-size chunks to respect backend query limits, and the four
//! lookup passes run sequentially (assessments by id, assessments by batch,
//! transactions by id reference, transactions by batch reference).

use std::collections::HashSet;

use service_core::error::AppError;
use tracing::{info, instrument, warn};

use crate::models::{Assessment, FinanceTransaction, PurchaseRecord};
use crate::services::range::DateRange;
use crate::services::store::ReportStore;

/// Everything one report load pulled from the backend.
///
/// `errors` holds chunk-level failures. Each one aborted the remaining chunks
/// of its own pass only; partial results merged before the failure are kept,
/// which is why a record can show a "missing" join even though its
/// counterpart exists upstream.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<PurchaseRecord>,
    pub assessments: Vec<Assessment>,
    pub transactions: Vec<FinanceTransaction>,
    pub errors: Vec<AppError>,
}

/// Fetch the three source collections for `range`.
///
/// Returns `Err` only when the purchase-record query itself fails; lookup
/// passes degrade into `FetchOutcome::errors` instead. An empty record set
/// short-circuits without issuing any lookup request.
#[instrument(skip(store, finance_types), fields(from = %range.from, to = %range.to))]
pub async fn fetch_sources<S: ReportStore + ?Sized>(
    store: &S,
    range: DateRange,
    chunk_size: usize,
    finance_types: &[String],
) -> Result<FetchOutcome, AppError> {
    let records = store.purchase_records_in_range(range.from, range.to).await?;
    if records.is_empty() {
        info!("no purchase records in range, skipping lookups");
        return Ok(FetchOutcome::default());
    }

    let ids = distinct(records.iter().map(|r| r.id.as_str()));
    let batch_numbers = distinct(
        records
            .iter()
            .map(|r| r.batch_number.as_str())
            .filter(|b| !b.is_empty()),
    );

    let mut outcome = FetchOutcome {
        records,
        ..FetchOutcome::default()
    };

    // Assessments: id chunks first, then batch chunks; first occurrence of an
    // assessment id wins on merge.
    let mut seen_assessments = HashSet::new();
    for chunk in ids.chunks(chunk_size) {
        match store.assessments_by_record_ids(chunk).await {
            Ok(found) => merge_by_id(&mut outcome.assessments, &mut seen_assessments, found, |a| {
                a.id.as_str()
            }),
            Err(e) => {
                warn!(error = %e, pass = "assessments_by_id", "chunk request failed, aborting pass");
                outcome.errors.push(e);
                break;
            }
        }
    }
    for chunk in batch_numbers.chunks(chunk_size) {
        match store.assessments_by_batch_numbers(chunk).await {
            Ok(found) => merge_by_id(&mut outcome.assessments, &mut seen_assessments, found, |a| {
                a.id.as_str()
            }),
            Err(e) => {
                warn!(error = %e, pass = "assessments_by_batch", "chunk request failed, aborting pass");
                outcome.errors.push(e);
                break;
            }
        }
    }

    // Finance transactions: same two passes over the same chunk keys,
    // restricted to the purchase-payment type whitelist.
    let mut seen_transactions = HashSet::new();
    for chunk in ids.chunks(chunk_size) {
        match store.transactions_by_references(chunk, finance_types).await {
            Ok(found) => merge_by_id(
                &mut outcome.transactions,
                &mut seen_transactions,
                found,
                |t| t.id.as_str(),
            ),
            Err(e) => {
                warn!(error = %e, pass = "transactions_by_id", "chunk request failed, aborting pass");
                outcome.errors.push(e);
                break;
            }
        }
    }
    for chunk in batch_numbers.chunks(chunk_size) {
        match store.transactions_by_references(chunk, finance_types).await {
            Ok(found) => merge_by_id(
                &mut outcome.transactions,
                &mut seen_transactions,
                found,
                |t| t.id.as_str(),
            ),
            Err(e) => {
                warn!(error = %e, pass = "transactions_by_batch", "chunk request failed, aborting pass");
                outcome.errors.push(e);
                break;
            }
        }
    }

    info!(
        records = outcome.records.len(),
        assessments = outcome.assessments.len(),
        transactions = outcome.transactions.len(),
        failed_passes = outcome.errors.len(),
        "source fetch complete"
    );

    Ok(outcome)
}

/// Distinct values in first-seen order.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .filter(|v| seen.insert(v.to_string()))
        .map(|v| v.to_string())
        .collect()
}

/// Append `found` entries whose id has not been merged yet.
fn merge_by_id<T, F>(target: &mut Vec<T>, seen: &mut HashSet<String>, found: Vec<T>, id_of: F)
where
    F: Fn(&T) -> &str,
{
    for item in found {
        if seen.insert(id_of(&item).to_string()) {
            target.push(item);
        }
    }
}
