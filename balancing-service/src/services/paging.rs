//! Pagination for the report presenter.

use crate::models::ReconciledRow;

pub const PAGE_SIZE_OPTIONS: [usize; 4] = [10, 25, 50, 100];
pub const DEFAULT_PAGE_SIZE: usize = 25;

/// Current page window over the filtered row set.
///
/// The page is re-clamped into `[1, page_count]` whenever the row count or
/// the page size changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

impl Pagination {
    pub fn new(page_size: usize) -> Self {
        let page_size = if PAGE_SIZE_OPTIONS.contains(&page_size) {
            page_size
        } else {
            DEFAULT_PAGE_SIZE
        };
        Self { page: 1, page_size }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size).max(1)
    }

    pub fn set_page(&mut self, page: usize, row_count: usize) {
        self.page = page.clamp(1, self.page_count(row_count));
    }

    pub fn set_page_size(&mut self, page_size: usize, row_count: usize) {
        if PAGE_SIZE_OPTIONS.contains(&page_size) {
            self.page_size = page_size;
        }
        self.set_page(self.page, row_count);
    }

    /// Re-clamp after the filtered count changed.
    pub fn reclamp(&mut self, row_count: usize) {
        self.set_page(self.page, row_count);
    }

    pub fn page_slice<'a>(&self, rows: &'a [ReconciledRow]) -> &'a [ReconciledRow] {
        let start = (self.page - 1) * self.page_size;
        if start >= rows.len() {
            return &[];
        }
        let end = (start + self.page_size).min(rows.len());
        &rows[start..end]
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinanceState, PurchaseRecord};
    use rust_decimal::Decimal;

    fn rows(count: usize) -> Vec<ReconciledRow> {
        (0..count)
            .map(|i| ReconciledRow {
                record: PurchaseRecord {
                    id: format!("R{i}"),
                    batch_number: format!("B{i}"),
                    date: "2024-03-10".parse().unwrap(),
                    coffee_type: "arabica".to_string(),
                    kilograms: Decimal::from(10),
                    bags: 1,
                    supplier_name: "s".to_string(),
                    status: "delivered".to_string(),
                },
                assessment: None,
                transactions: Vec::new(),
                paid_total: Decimal::ZERO,
                confirmed_paid: Decimal::ZERO,
                has_assessment: false,
                finance_state: FinanceState::Missing,
                is_balanced: false,
            })
            .collect()
    }

    #[test]
    fn unknown_page_size_falls_back_to_default() {
        assert_eq!(Pagination::new(33).page_size(), DEFAULT_PAGE_SIZE);
        assert_eq!(Pagination::new(50).page_size(), 50);
    }

    #[test]
    fn page_is_clamped_when_count_shrinks() {
        let mut paging = Pagination::new(10);
        paging.set_page(5, 50);
        assert_eq!(paging.page(), 5);
        paging.reclamp(11);
        assert_eq!(paging.page(), 2);
        paging.reclamp(0);
        assert_eq!(paging.page(), 1);
    }

    #[test]
    fn page_size_change_reclamps_page() {
        let mut paging = Pagination::new(10);
        paging.set_page(3, 30);
        paging.set_page_size(100, 30);
        assert_eq!(paging.page(), 1);
    }

    #[test]
    fn page_slice_returns_the_window() {
        let all = rows(23);
        let mut paging = Pagination::new(10);
        paging.set_page(3, all.len());
        let slice = paging.page_slice(&all);
        assert_eq!(slice.len(), 3);
        assert_eq!(slice[0].record.id, "R20");
    }

    #[test]
    fn empty_set_has_one_empty_page() {
        let paging = Pagination::new(10);
        assert_eq!(paging.page_count(0), 1);
        assert!(paging.page_slice(&[]).is_empty());
    }
}
