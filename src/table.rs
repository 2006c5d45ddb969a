//! Submissions table view model
//!
//! Search, sorting, column selection and pagination over the rows returned
//! by `GET /forms/submissions`.

use serde_json::Value;
use std::cmp::Ordering;

use crate::domain::{SubmissionPage, SubmissionRecord};

pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Sort order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggle(&self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }
}

/// Text shown in a table cell: strings unquoted, missing as empty
pub fn cell_text(record: &SubmissionRecord, column: &str) -> String {
    match record.cell(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Clone)]
pub struct SubmissionTable {
    rows: Vec<SubmissionRecord>,
    columns: Vec<String>,
    visible: Vec<String>,
    search: String,
    sort: Option<(String, SortOrder)>,
    /// 0-indexed
    page: usize,
    page_size: usize,
}

impl SubmissionTable {
    pub fn new(page: SubmissionPage) -> Self {
        Self::with_page_size(page, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(page: SubmissionPage, page_size: usize) -> Self {
        Self {
            visible: page.columns.clone(),
            rows: page.data,
            columns: page.columns,
            search: String::new(),
            sort: None,
            page: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn visible_columns(&self) -> &[String] {
        &self.visible
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.visible.iter().any(|c| c == column)
    }

    /// Shows or hides a column. Re-shown columns return to their original position.
    pub fn toggle_column(&mut self, column: &str) {
        if self.is_visible(column) {
            self.visible.retain(|c| c != column);
        } else if self.columns.iter().any(|c| c == column) {
            let keep: Vec<String> = self
                .columns
                .iter()
                .filter(|c| *c == column || self.is_visible(c))
                .cloned()
                .collect();
            self.visible = keep;
        }
        self.clamp_page();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Sets the query and returns to the first page
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.search = query.into();
        self.page = 0;
    }

    pub fn sort(&self) -> Option<(&str, SortOrder)> {
        self.sort.as_ref().map(|(c, o)| (c.as_str(), *o))
    }

    /// Sorts ascending by `column`; the active sort column flips direction
    pub fn sort_by(&mut self, column: &str) {
        self.sort = match self.sort.take() {
            Some((current, order)) if current == column => Some((current, order.toggle())),
            _ => Some((column.to_string(), SortOrder::Ascending)),
        };
    }

    pub fn set_sort(&mut self, column: &str, order: SortOrder) {
        self.sort = Some((column.to_string(), order));
    }

    /// Rows matching the search over visible columns, sorted
    pub fn matching_rows(&self) -> Vec<&SubmissionRecord> {
        let query = self.search.to_lowercase();
        let mut rows: Vec<&SubmissionRecord> = self
            .rows
            .iter()
            .filter(|row| {
                query.is_empty()
                    || self
                        .visible
                        .iter()
                        .any(|col| cell_text(row, col).to_lowercase().contains(&query))
            })
            .collect();

        if let Some((column, order)) = &self.sort {
            rows.sort_by(|a, b| {
                let cmp = compare_cells(&cell_text(a, column), &cell_text(b, column));
                match order {
                    SortOrder::Ascending => cmp,
                    SortOrder::Descending => cmp.reverse(),
                }
            });
        }

        rows
    }

    /// Rows of the current page
    pub fn rows(&self) -> Vec<&SubmissionRecord> {
        self.matching_rows()
            .into_iter()
            .skip(self.page * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn total_items(&self) -> usize {
        self.matching_rows().len()
    }

    pub fn total_pages(&self) -> usize {
        self.total_items().div_ceil(self.page_size)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_previous(&self) -> bool {
        self.page > 0
    }

    pub fn has_next(&self) -> bool {
        (self.page + 1) * self.page_size < self.total_items()
    }

    pub fn next_page(&mut self) {
        if self.has_next() {
            self.page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.page = self.page.saturating_sub(1);
    }

    /// Jumps to a page, clamped to the available range
    pub fn go_to(&mut self, page: usize) {
        self.page = page;
        self.clamp_page();
    }

    fn clamp_page(&mut self) {
        let last = self.total_pages().saturating_sub(1);
        self.page = self.page.min(last);
    }
}

/// Case-insensitive text order; numbers compare numerically when both parse
fn compare_cells(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => a.to_lowercase().cmp(&b.to_lowercase()),
    }
}
