//! Row filters applied before aggregation and presentation.
//!
//! Filters are pure over the already-fetched row set; changing them never
//! triggers a re-fetch. Only a date-range change does.

use crate::models::{FinanceState, ReconciledRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssessmentFilter {
    #[default]
    All,
    Assessed,
    NotAssessed,
}

impl AssessmentFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Assessed => "assessed",
            Self::NotAssessed => "not_assessed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "assessed" => Self::Assessed,
            "not_assessed" => Self::NotAssessed,
            _ => Self::All,
        }
    }

    fn matches(&self, row: &ReconciledRow) -> bool {
        match self {
            Self::All => true,
            Self::Assessed => row.has_assessment,
            Self::NotAssessed => !row.has_assessment,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FinanceFilter {
    #[default]
    All,
    Missing,
    Pending,
    Confirmed,
}

impl FinanceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Missing => "missing",
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "missing" => Self::Missing,
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            _ => Self::All,
        }
    }

    fn matches(&self, row: &ReconciledRow) -> bool {
        match self {
            Self::All => true,
            Self::Missing => row.finance_state == FinanceState::Missing,
            Self::Pending => row.finance_state == FinanceState::Pending,
            Self::Confirmed => row.finance_state == FinanceState::Confirmed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BalanceFilter {
    #[default]
    All,
    Balanced,
    Unbalanced,
}

impl BalanceFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Balanced => "balanced",
            Self::Unbalanced => "unbalanced",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "balanced" => Self::Balanced,
            "unbalanced" => Self::Unbalanced,
            _ => Self::All,
        }
    }

    fn matches(&self, row: &ReconciledRow) -> bool {
        match self {
            Self::All => true,
            Self::Balanced => row.is_balanced,
            Self::Unbalanced => !row.is_balanced,
        }
    }
}

/// The active predicate set; a row passes iff all of them match.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    pub assessment: AssessmentFilter,
    pub finance: FinanceFilter,
    pub balance: BalanceFilter,
    pub coffee_type: Option<String>,
    pub record_status: Option<String>,
    /// Case-insensitive substring over batch number, supplier, coffee type
    /// and status, concatenated. Not tokenized.
    pub search: Option<String>,
}

impl RowFilter {
    pub fn matches(&self, row: &ReconciledRow) -> bool {
        if !self.assessment.matches(row)
            || !self.finance.matches(row)
            || !self.balance.matches(row)
        {
            return false;
        }
        if let Some(coffee_type) = &self.coffee_type {
            if &row.record.coffee_type != coffee_type {
                return false;
            }
        }
        if let Some(record_status) = &self.record_status {
            if &row.record.status != record_status {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            if !needle.is_empty() {
                let haystack = format!(
                    "{}{}{}{}",
                    row.record.batch_number,
                    row.record.supplier_name,
                    row.record.coffee_type,
                    row.record.status
                )
                .to_lowercase();
                if !haystack.contains(&needle) {
                    return false;
                }
            }
        }
        true
    }

    pub fn apply(&self, rows: &[ReconciledRow]) -> Vec<ReconciledRow> {
        rows.iter().filter(|r| self.matches(r)).cloned().collect()
    }

    /// Human-readable description of the active predicates, used by the
    /// summary export's audit trail.
    pub fn describe(&self) -> String {
        let mut parts = vec![
            format!("assessment={}", self.assessment.as_str()),
            format!("finance={}", self.finance.as_str()),
            format!("balance={}", self.balance.as_str()),
        ];
        if let Some(coffee_type) = &self.coffee_type {
            parts.push(format!("coffee_type={coffee_type}"));
        }
        if let Some(record_status) = &self.record_status {
            parts.push(format!("status={record_status}"));
        }
        if let Some(search) = &self.search {
            if !search.is_empty() {
                parts.push(format!("search=\"{search}\""));
            }
        }
        parts.join(", ")
    }
}
