//! Join and classification of purchase records against assessments and
//! payments.
//!
//! The three ledgers share no foreign key. Assessments link to a record by
//! `source_record_id` or, degraded, by `batch_number`; payments link by a
//! free-string `reference` carrying either value. Batch numbers can be reused
//! across re-batched records, so an id match always beats a batch match.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::models::{
    Assessment, FinanceState, FinanceTransaction, PaymentStatus, PurchaseRecord, ReconciledRow,
};

/// Join each purchase record to at most one assessment and to all payments
/// posted under one of its reference keys, then classify coverage.
///
/// Pure: the same inputs always produce the same rows, in record order.
pub fn reconcile(
    records: &[PurchaseRecord],
    assessments: &[Assessment],
    transactions: &[FinanceTransaction],
) -> Vec<ReconciledRow> {
    let (by_id, by_batch) = assessment_lookups(assessments);
    let by_reference = transaction_lookup(transactions);

    records
        .iter()
        .map(|record| {
            let assessment = by_id
                .get(record.id.as_str())
                .or_else(|| by_batch.get(record.batch_number.as_str()))
                .map(|a| (*a).clone());

            // Either/or, never a union: payments for one record are expected
            // to use one consistent reference value, so an id hit shadows any
            // batch-keyed transactions and vice versa.
            let transactions: Vec<FinanceTransaction> = by_reference
                .get(record.id.as_str())
                .or_else(|| by_reference.get(record.batch_number.as_str()))
                .map(|matched| matched.iter().map(|t| (*t).clone()).collect())
                .unwrap_or_default();

            classify(record.clone(), assessment, transactions)
        })
        .collect()
}

/// Most-recent-assessment lookups by precise id link and by batch fallback.
///
/// One descending stable sort on `date_assessed` orders candidates; the first
/// occurrence per key is the most recent, with ties broken by input order.
fn assessment_lookups<'a>(
    assessments: &'a [Assessment],
) -> (HashMap<&'a str, &'a Assessment>, HashMap<&'a str, &'a Assessment>) {
    let mut ordered: Vec<&Assessment> = assessments.iter().collect();
    ordered.sort_by(|a, b| b.date_assessed.cmp(&a.date_assessed));

    let mut by_id = HashMap::new();
    let mut by_batch = HashMap::new();
    for assessment in ordered {
        if let Some(source_id) = assessment.source_record_id.as_deref() {
            if !source_id.is_empty() {
                by_id.entry(source_id).or_insert(assessment);
            }
        }
        if !assessment.batch_number.is_empty() {
            by_batch
                .entry(assessment.batch_number.as_str())
                .or_insert(assessment);
        }
    }
    (by_id, by_batch)
}

/// All transactions grouped by reference; a reference legitimately carries
/// many partial payments.
fn transaction_lookup(
    transactions: &[FinanceTransaction],
) -> HashMap<&str, Vec<&FinanceTransaction>> {
    let mut by_reference: HashMap<&str, Vec<&FinanceTransaction>> = HashMap::new();
    for transaction in transactions {
        by_reference
            .entry(transaction.reference.as_str())
            .or_default()
            .push(transaction);
    }
    by_reference
}

fn classify(
    record: PurchaseRecord,
    assessment: Option<Assessment>,
    transactions: Vec<FinanceTransaction>,
) -> ReconciledRow {
    let paid_total = transactions
        .iter()
        .fold(Decimal::ZERO, |acc, t| acc + t.amount);
    let confirmed_paid = transactions
        .iter()
        .filter(|t| t.payment_status() == PaymentStatus::Confirmed)
        .fold(Decimal::ZERO, |acc, t| acc + t.amount);

    let finance_state = if transactions.is_empty() {
        FinanceState::Missing
    } else if transactions
        .iter()
        .any(|t| t.payment_status() == PaymentStatus::Confirmed)
    {
        FinanceState::Confirmed
    } else {
        FinanceState::Pending
    };

    let has_assessment = assessment.is_some();
    let is_balanced = has_assessment && finance_state != FinanceState::Missing;

    ReconciledRow {
        record,
        assessment,
        transactions,
        paid_total,
        confirmed_paid,
        has_assessment,
        finance_state,
        is_balanced,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(id: &str, batch: &str) -> PurchaseRecord {
        PurchaseRecord {
            id: id.to_string(),
            batch_number: batch.to_string(),
            date: "2024-03-10".parse().unwrap(),
            coffee_type: "arabica".to_string(),
            kilograms: Decimal::from(120),
            bags: 2,
            supplier_name: "Kanyange".to_string(),
            status: "delivered".to_string(),
        }
    }

    fn assessment(id: &str, source: Option<&str>, batch: &str, dated: &str) -> Assessment {
        Assessment {
            id: id.to_string(),
            source_record_id: source.map(|s| s.to_string()),
            batch_number: batch.to_string(),
            status: "graded".to_string(),
            date_assessed: dated.to_string(),
            assessed_by: "qa".to_string(),
            suggested_price: Decimal::from(900),
            final_price: None,
        }
    }

    fn tx(id: &str, reference: &str, amount: i64, status: &str) -> FinanceTransaction {
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

    #[test]
    fn most_recent_assessment_wins_per_key() {
        let rows = reconcile(
            &[record("R1", "B1")],
            &[
                assessment("A1", Some("R1"), "B1", "2024-03-01"),
                assessment("A2", Some("R1"), "B1", "2024-03-05"),
            ],
            &[],
        );
        assert_eq!(rows[0].assessment.as_ref().unwrap().id, "A2");
    }

    #[test]
    fn tie_on_date_keeps_input_order() {
        let rows = reconcile(
            &[record("R1", "B1")],
            &[
                assessment("A1", Some("R1"), "B1", "2024-03-05"),
                assessment("A2", Some("R1"), "B1", "2024-03-05"),
            ],
            &[],
        );
        assert_eq!(rows[0].assessment.as_ref().unwrap().id, "A1");
    }

    #[test]
    fn id_match_beats_more_recent_batch_match() {
        let rows = reconcile(
            &[record("R1", "B1")],
            &[
                assessment("BY_ID", Some("R1"), "", "2024-03-01"),
                assessment("BY_BATCH", None, "B1", "2024-03-09"),
            ],
            &[],
        );
        assert_eq!(rows[0].assessment.as_ref().unwrap().id, "BY_ID");
    }

    #[test]
    fn batch_fallback_applies_when_id_link_is_absent() {
        let rows = reconcile(
            &[record("R1", "B1")],
            &[assessment("A1", None, "B1", "2024-03-05")],
            &[],
        );
        assert!(rows[0].has_assessment);
        assert_eq!(rows[0].assessment.as_ref().unwrap().id, "A1");
    }

    #[test]
    fn id_reference_shadows_batch_reference() {
        let rows = reconcile(
            &[record("R1", "B1")],
            &[],
            &[tx("T1", "R1", 1000, "pending"), tx("T2", "B1", 400, "pending")],
        );
        assert_eq!(rows[0].transactions.len(), 1);
        assert_eq!(rows[0].transactions[0].id, "T1");
        assert_eq!(rows[0].paid_total, Decimal::from(1000));
    }

    #[test]
    fn missing_iff_no_transactions() {
        let rows = reconcile(&[record("R1", "B1")], &[], &[]);
        assert_eq!(rows[0].finance_state, FinanceState::Missing);
        assert!(!rows[0].is_balanced);

        let rows = reconcile(
            &[record("R1", "B1")],
            &[],
            &[tx("T1", "R1", 100, "pending")],
        );
        assert_eq!(rows[0].finance_state, FinanceState::Pending);
    }

    #[test]
    fn one_confirmed_transaction_confirms_the_record() {
        let rows = reconcile(
            &[record("R2", "B2")],
            &[],
            &[
                tx("T1", "R2", 1000, "pending"),
                tx("T2", "R2", 500, "confirmed"),
            ],
        );
        assert_eq!(rows[0].paid_total, Decimal::from(1500));
        assert_eq!(rows[0].confirmed_paid, Decimal::from(500));
        assert_eq!(rows[0].finance_state, FinanceState::Confirmed);
    }

    #[test]
    fn assessed_and_financed_is_balanced() {
        let rows = reconcile(
            &[record("R1", "B1")],
            &[assessment("A1", Some("R1"), "B1", "2024-03-05")],
            &[tx("T1", "R1", 100, "pending")],
        );
        assert!(rows[0].is_balanced);
    }

    #[test]
    fn reconcile_is_idempotent() {
        let records = [record("R1", "B1"), record("R2", "")];
        let assessments = [
            assessment("A1", Some("R1"), "B1", "2024-03-01"),
            assessment("A2", None, "B1", "2024-03-09"),
        ];
        let transactions = [
            tx("T1", "R1", 1000, "confirmed"),
            tx("T2", "R2", 250, "pending"),
        ];
        let first = reconcile(&records, &assessments, &transactions);
        let second = reconcile(&records, &assessments, &transactions);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!(a.record.id, b.record.id);
            assert_eq!(
                a.assessment.as_ref().map(|x| x.id.as_str()),
                b.assessment.as_ref().map(|x| x.id.as_str())
            );
            assert_eq!(a.paid_total, b.paid_total);
            assert_eq!(a.finance_state, b.finance_state);
            assert_eq!(a.is_balanced, b.is_balanced);
        }
    }
}
