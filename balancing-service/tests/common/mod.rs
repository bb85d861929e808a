//! Common test utilities for balancing-service integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use balancing_service::config::ReportConfig;
use balancing_service::models::{Assessment, FinanceTransaction, PurchaseRecord};
use balancing_service::services::ReportStore;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use service_core::error::AppError;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,balancing_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// In-memory store with per-method call counters and injectable failures.
pub struct FakeStore {
    pub records: Vec<PurchaseRecord>,
    pub assessments: Vec<Assessment>,
    pub transactions: Vec<FinanceTransaction>,
    pub session_ok: bool,
    /// Fail the Nth (1-based) call to `assessments_by_record_ids`.
    pub fail_assessment_id_call: Option<usize>,
    pub calls: CallCounters,
    pub seen_finance_types: Mutex<Vec<String>>,
}

#[derive(Default)]
pub struct CallCounters {
    pub records: AtomicUsize,
    pub assessments_by_id: AtomicUsize,
    pub assessments_by_batch: AtomicUsize,
    pub transactions: AtomicUsize,
}

impl Default for FakeStore {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            assessments: Vec::new(),
            transactions: Vec::new(),
            session_ok: true,
            fail_assessment_id_call: None,
            calls: CallCounters::default(),
            seen_finance_types: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ReportStore for FakeStore {
    async fn check_session(&self) -> Result<(), AppError> {
        if !self.session_ok {
            return Err(AppError::Auth("no active session".to_string()));
        }
        Ok(())
    }

    async fn purchase_records_in_range(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PurchaseRecord>, AppError> {
        self.calls.records.fetch_add(1, Ordering::SeqCst);
        let mut found: Vec<PurchaseRecord> = self
            .records
            .iter()
            .filter(|r| r.date >= from && r.date <= to)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(found)
    }

    async fn assessments_by_record_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<Assessment>, AppError> {
        let call = self.calls.assessments_by_id.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_assessment_id_call == Some(call) {
            return Err(AppError::Network(anyhow::anyhow!("injected chunk failure")));
        }
        Ok(self
            .assessments
            .iter()
            .filter(|a| {
                a.source_record_id
                    .as_ref()
                    .is_some_and(|src| ids.contains(src))
            })
            .cloned()
            .collect())
    }

    async fn assessments_by_batch_numbers(
        &self,
        batch_numbers: &[String],
    ) -> Result<Vec<Assessment>, AppError> {
        self.calls.assessments_by_batch.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .assessments
            .iter()
            .filter(|a| batch_numbers.contains(&a.batch_number))
            .cloned()
            .collect())
    }

    async fn transactions_by_references(
        &self,
        references: &[String],
        transaction_types: &[String],
    ) -> Result<Vec<FinanceTransaction>, AppError> {
        self.calls.transactions.fetch_add(1, Ordering::SeqCst);
        self.seen_finance_types
            .lock()
            .unwrap()
            .extend(transaction_types.iter().cloned());
        Ok(self
            .transactions
            .iter()
            .filter(|t| {
                references.contains(&t.reference)
                    && transaction_types.contains(&t.transaction_type)
            })
            .cloned()
            .collect())
    }
}

pub fn record(id: &str, batch: &str, date: &str) -> PurchaseRecord {
    PurchaseRecord {
        id: id.to_string(),
        batch_number: batch.to_string(),
        date: date.parse().expect("valid test date"),
        coffee_type: "arabica".to_string(),
        kilograms: Decimal::from(120),
        bags: 2,
        supplier_name: "Kanyange CWS".to_string(),
        status: "delivered".to_string(),
    }
}

pub fn assessment(id: &str, source: Option<&str>, batch: &str, dated: &str) -> Assessment {
    Assessment {
        id: id.to_string(),
        source_record_id: source.map(|s| s.to_string()),
        batch_number: batch.to_string(),
        status: "graded".to_string(),
        date_assessed: dated.to_string(),
        assessed_by: "qa-officer".to_string(),
        suggested_price: Decimal::from(900),
        final_price: Some(Decimal::from(880)),
    }
}

pub fn transaction(id: &str, reference: &str, amount: i64, status: &str) -> FinanceTransaction {
    FinanceTransaction {
        id: id.to_string(),
        transaction_type: "coffee_purchase".to_string(),
        amount: Decimal::from(amount),
        balance_after: Decimal::ZERO,
        reference: reference.to_string(),
        status: status.to_string(),
        created_at: Utc::now(),
    }
}

pub fn report_config(chunk_size: usize) -> ReportConfig {
    ReportConfig {
        chunk_size,
        finance_types: vec!["coffee_purchase".to_string()],
        page_size: 25,
    }
}
