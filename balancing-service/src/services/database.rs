//! Postgres-backed store for balancing-service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use service_core::error::{classify_sqlx, AppError};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};

use crate::models::{Assessment, FinanceTransaction, PurchaseRecord};
use crate::services::store::ReportStore;

/// Database connection pool wrapper over the hosted backend.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "balancing-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(classify_sqlx)?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(classify_sqlx)?;
        Ok(())
    }
}

#[async_trait]
impl ReportStore for Database {
    #[instrument(skip(self))]
    async fn check_session(&self) -> Result<(), AppError> {
        let (user,): (String,) = sqlx::query_as("SELECT current_user")
            .fetch_one(&self.pool)
            .await
            .map_err(classify_sqlx)?;

        if user.is_empty() {
            return Err(AppError::Auth("no authenticated session".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn purchase_records_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PurchaseRecord>, AppError> {
        sqlx::query_as::<_, PurchaseRecord>(
            r#"
            SELECT id, batch_number, date, coffee_type, kilograms, bags, supplier_name, status
            FROM purchase_records
            WHERE date BETWEEN $1 AND $2
            ORDER BY date DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx)
    }

    #[instrument(skip(self, ids), fields(keys = ids.len()))]
    async fn assessments_by_record_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<Assessment>, AppError> {
        sqlx::query_as::<_, Assessment>(
            r#"
            SELECT id, source_record_id, batch_number, status, date_assessed, assessed_by,
                   suggested_price, final_price
            FROM assessments
            WHERE source_record_id = ANY($1)
            ORDER BY date_assessed DESC
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx)
    }

    #[instrument(skip(self, batch_numbers), fields(keys = batch_numbers.len()))]
    async fn assessments_by_batch_numbers(
        &self,
        batch_numbers: &[String],
    ) -> Result<Vec<Assessment>, AppError> {
        sqlx::query_as::<_, Assessment>(
            r#"
            SELECT id, source_record_id, batch_number, status, date_assessed, assessed_by,
                   suggested_price, final_price
            FROM assessments
            WHERE batch_number = ANY($1)
            ORDER BY date_assessed DESC
            "#,
        )
        .bind(batch_numbers)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx)
    }

    #[instrument(skip(self, references, transaction_types), fields(keys = references.len()))]
    async fn transactions_by_references(
        &self,
        references: &[String],
        transaction_types: &[String],
    ) -> Result<Vec<FinanceTransaction>, AppError> {
        sqlx::query_as::<_, FinanceTransaction>(
            r#"
            SELECT id, transaction_type, amount, balance_after, reference, status, created_at
            FROM finance_transactions
            WHERE reference = ANY($1) AND transaction_type = ANY($2)
            ORDER BY created_at
            "#,
        )
        .bind(references)
        .bind(transaction_types)
        .fetch_all(&self.pool)
        .await
        .map_err(classify_sqlx)
    }
}
