//! Data-source capability trait for the balancing report.

use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::AppError;

use crate::models::{Assessment, FinanceTransaction, PurchaseRecord};

/// Read-only access to the three source ledgers plus the session check.
///
/// Every method is exactly one backend request. Chunking key lists to the
/// backend's IN-list limit is the fetcher's responsibility, not the store's.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Verify there is an authenticated session. Runs once per report load;
    /// a failure aborts the load before any data is fetched.
    async fn check_session(&self) -> Result<(), AppError>;

    /// Purchase records with `date` in the inclusive range, newest first.
    async fn purchase_records_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PurchaseRecord>, AppError>;

    /// Assessments whose `source_record_id` is in `ids`.
    async fn assessments_by_record_ids(&self, ids: &[String])
        -> Result<Vec<Assessment>, AppError>;

    /// Assessments whose `batch_number` is in `batch_numbers`.
    async fn assessments_by_batch_numbers(
        &self,
        batch_numbers: &[String],
    ) -> Result<Vec<Assessment>, AppError>;

    /// Finance transactions whose `reference` is in `references`, restricted
    /// to the purchase-payment `transaction_types` whitelist.
    async fn transactions_by_references(
        &self,
        references: &[String],
        transaction_types: &[String],
    ) -> Result<Vec<FinanceTransaction>, AppError>;
}
