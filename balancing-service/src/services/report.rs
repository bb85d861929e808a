//! Balancing report pipeline: resolve the range, fetch the three sources,
//! reconcile, and hold the resulting row set for filtering and export.

use std::sync::Arc;

use chrono::NaiveDate;
use service_core::error::{AppError, ErrorLog};
use tracing::{info, instrument};

use crate::config::ReportConfig;
use crate::models::ReconciledRow;
use crate::services::fetcher::fetch_sources;
use crate::services::range::{DateRange, RangeSelection};
use crate::services::reconcile::reconcile;
use crate::services::store::ReportStore;

/// One report's state: the injected store, the range selection, the rows of
/// the last successful load, and the bounded error log.
///
/// `refresh` takes `&mut self`, so loads are serialized by exclusive borrow
/// and a stale load can never overwrite a newer one. Filters, summaries,
/// pagination and export all read the loaded rows synchronously; only a
/// range change warrants another `refresh`.
pub struct BalancingReport<S: ReportStore> {
    store: Arc<S>,
    config: ReportConfig,
    selection: RangeSelection,
    range: Option<DateRange>,
    rows: Vec<ReconciledRow>,
    error_log: ErrorLog,
}

impl<S: ReportStore> BalancingReport<S> {
    pub fn new(store: Arc<S>, config: ReportConfig, selection: RangeSelection) -> Self {
        Self {
            store,
            config,
            selection,
            range: None,
            rows: Vec::new(),
            error_log: ErrorLog::default(),
        }
    }

    pub fn rows(&self) -> &[ReconciledRow] {
        &self.rows
    }

    /// The resolved range of the last successful load.
    pub fn range(&self) -> Option<DateRange> {
        self.range
    }

    pub fn selection(&self) -> &RangeSelection {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut RangeSelection {
        &mut self.selection
    }

    pub fn error_log(&self) -> &ErrorLog {
        &self.error_log
    }

    /// Run the full pipeline for the current range selection.
    ///
    /// Every classified failure is appended to the error log. `Err` is
    /// returned only for aborts that produced no usable row set (bad config,
    /// missing session, invalid range, or the record query itself failing);
    /// chunk-level lookup failures degrade to partial rows with visibly
    /// missing joins and the call still returns `Ok`.
    #[instrument(skip(self, today), fields(preset = self.selection.preset().as_str()))]
    pub async fn refresh(&mut self, today: NaiveDate) -> Result<(), AppError> {
        if let Err(e) = self.config.validate() {
            return Err(self.fail(e));
        }
        let session = self.store.check_session().await;
        if let Err(e) = session {
            return Err(self.fail(e));
        }
        let range = match self.selection.resolve(today) {
            Ok(range) => range,
            Err(e) => return Err(self.fail(e)),
        };

        let fetched = fetch_sources(
            self.store.as_ref(),
            range,
            self.config.chunk_size,
            &self.config.finance_types,
        )
        .await;
        let outcome = match fetched {
            Ok(outcome) => outcome,
            Err(e) => return Err(self.fail(e)),
        };

        for err in &outcome.errors {
            self.error_log.push(err);
        }

        self.rows = reconcile(
            &outcome.records,
            &outcome.assessments,
            &outcome.transactions,
        );
        self.range = Some(range);

        info!(
            from = %range.from,
            to = %range.to,
            rows = self.rows.len(),
            partial_failures = outcome.errors.len(),
            "balancing report refreshed"
        );
        Ok(())
    }

    fn fail(&mut self, err: AppError) -> AppError {
        self.error_log.push(&err);
        err
    }
}
