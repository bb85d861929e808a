//! Application startup and report lifecycle management.

use std::sync::Arc;

use chrono::Utc;
use service_core::error::AppError;
use tracing::{info, warn};

use crate::config::BalancingConfig;
use crate::services::export::{export_file_name, write_detail_csv, write_summary_csv};
use crate::services::filter::RowFilter;
use crate::services::paging::Pagination;
use crate::services::summary::summarize;
use crate::services::{BalancingReport, Database};

/// Application container wiring the store and the report together.
pub struct Application {
    config: BalancingConfig,
    report: BalancingReport<Database>,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: BalancingConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        let report = BalancingReport::new(
            Arc::new(db),
            config.report.clone(),
            config.range.selection(),
        );

        Ok(Self { config, report })
    }

    /// Run one report: refresh, log the summary, write both CSV exports.
    pub async fn run(mut self) -> Result<(), AppError> {
        let today = Utc::now().date_naive();
        self.report.refresh(today).await?;

        for entry in self.report.error_log().entries() {
            warn!(
                kind = entry.kind.as_str(),
                message = %entry.message,
                hint = entry.hint,
                "partial failure during load"
            );
        }

        let filter = RowFilter::default();
        let rows = filter.apply(self.report.rows());
        let summary = summarize(&rows);

        info!(
            rows = summary.total_rows,
            assessed = summary.assessed_count,
            finance_missing = summary.finance_missing_count,
            balanced = summary.balanced_count,
            flow_health = summary.flow_health,
            "balancing report ready"
        );

        if rows.is_empty() {
            info!("no rows in range, skipping exports");
            return Ok(());
        }

        let mut paging = Pagination::new(self.config.report.page_size);
        paging.reclamp(rows.len());
        for row in paging.page_slice(&rows) {
            tracing::debug!(
                record = %row.record.id,
                supplier = %row.record.supplier_name,
                finance = row.finance_state.as_str(),
                balance = row.balance_label(),
                "first page row"
            );
        }
        let Some(range) = self.report.range() else {
            return Ok(());
        };

        std::fs::create_dir_all(&self.config.export.dir)?;
        let generated_at = Utc::now();

        let detail_path = self
            .config
            .export
            .dir
            .join(export_file_name("balancing_report", range, generated_at));
        write_detail_csv(&detail_path, &rows)?;

        let summary_path = self
            .config
            .export
            .dir
            .join(export_file_name("balancing_summary", range, generated_at));
        write_summary_csv(
            &summary_path,
            &summary,
            &filter.describe(),
            range,
            &self.config.report.finance_types,
        )?;

        info!(
            detail = %detail_path.display(),
            summary = %summary_path.display(),
            "exports written"
        );
        Ok(())
    }
}
