//! Domain models for balancing-service.

#![allow(clippy::should_implement_trait)]

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// Purchase Records
// ============================================================================

/// One coffee-delivery intake entry from the purchase ledger.
///
/// Created by the intake workflow; read-only for the balancing report.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseRecord {
    pub id: String,
    /// May coincide across re-batched records; not a unique key.
    pub batch_number: String,
    pub date: NaiveDate,
    pub coffee_type: String,
    pub kilograms: Decimal,
    pub bags: i32,
    pub supplier_name: String,
    pub status: String,
}

// ============================================================================
// Assessments
// ============================================================================

/// A quality evaluation, soft-linked to a purchase record by
/// `source_record_id` or, degraded, by `batch_number`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Assessment {
    pub id: String,
    pub source_record_id: Option<String>,
    pub batch_number: String,
    pub status: String,
    /// Upstream-formatted ISO string; ordered lexicographically, not parsed.
    pub date_assessed: String,
    pub assessed_by: String,
    pub suggested_price: Decimal,
    pub final_price: Option<Decimal>,
}

// ============================================================================
// Finance Transactions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Confirmed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "confirmed" => Self::Confirmed,
            _ => Self::Pending,
        }
    }
}

/// A cash-ledger movement whose `reference` is expected to equal a purchase
/// record's id or its batch number.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FinanceTransaction {
    pub id: String,
    pub transaction_type: String,
    pub amount: Decimal,
    pub balance_after: Decimal,
    pub reference: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl FinanceTransaction {
    pub fn payment_status(&self) -> PaymentStatus {
        PaymentStatus::from_str(&self.status)
    }
}

// ============================================================================
// Reconciled Rows
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinanceState {
    Missing,
    Pending,
    Confirmed,
}

impl FinanceState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }
}

/// One purchase record joined to its best assessment and matched payments.
///
/// Built fresh on every report run and never mutated in place.
/// Invariants: `finance_state == Missing` iff `transactions` is empty;
/// `Confirmed` iff at least one matched transaction is confirmed;
/// `is_balanced == has_assessment && finance_state != Missing`.
#[derive(Debug, Clone)]
pub struct ReconciledRow {
    pub record: PurchaseRecord,
    pub assessment: Option<Assessment>,
    pub transactions: Vec<FinanceTransaction>,
    pub paid_total: Decimal,
    pub confirmed_paid: Decimal,
    pub has_assessment: bool,
    pub finance_state: FinanceState,
    pub is_balanced: bool,
}

impl ReconciledRow {
    /// Label used in list views and exports.
    pub fn balance_label(&self) -> &'static str {
        if self.is_balanced {
            "balanced"
        } else {
            "unbalanced"
        }
    }
}
