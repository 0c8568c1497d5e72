/// Dashtable Engine
///
/// Turns an in-memory record set plus the table controls into the exact page
/// of rows to display. The stages always run in the same order:
///
/// 1. search
/// 2. column filters
/// 3. sort
/// 4. paginate
///
/// Reordering the stages changes which rows land on which page, so the order
/// is fixed here rather than left to each view. The engine is a pure function
/// of its inputs and borrows the source records without copying them.

use crate::column::Columns;
use crate::filter::{apply_column_filters, search, FilterState};
use crate::pagination::{paginate, total_pages};
use crate::sort::{sort_rows, SortState};
use crate::value::Record;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Every control a table card exposes, in one serializable bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableQuery {
    pub search: String,
    /// Fields the search box looks at; `None` means every column accessor
    pub searchable: Option<Vec<String>>,
    pub filters: FilterState,
    pub sort: SortState,
    pub page: usize,
    pub page_size: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        TableQuery {
            search: String::new(),
            searchable: None,
            filters: FilterState::default(),
            sort: SortState::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl TableQuery {
    pub fn new(page_size: usize) -> Self {
        TableQuery {
            page_size,
            ..Self::default()
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn with_sort(mut self, sort: SortState) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filters(mut self, filters: FilterState) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }
}

/// Result of one engine run: the visible rows and pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageView<'a> {
    pub rows: Vec<&'a Record>,
    pub current_page: usize,
    pub page_size: usize,
    /// Rows after search and filters, before slicing
    pub total_items: usize,
    pub total_pages: usize,
    pub active_filters: usize,
}

impl<'a> PageView<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages && self.total_items > 0
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1 && self.total_items > 0
    }
}

/// The table pipeline bound to a set of columns.
///
/// # Examples
///
/// ```
/// use dashtable::{record, ColumnDescriptor, Columns, FieldValue, TableQuery, TabularEngine};
///
/// let rows: Vec<_> = (0..23)
///     .map(|i| record([("id", FieldValue::Int(i))]))
///     .collect();
/// let engine = TabularEngine::new(Columns::new(vec![ColumnDescriptor::new("id", "ID")]));
///
/// let view = engine.run(&rows, &TableQuery::new(10).with_page(3));
/// assert_eq!(view.rows.len(), 3);
/// assert_eq!(view.total_pages, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TabularEngine {
    columns: Columns,
}

impl TabularEngine {
    pub fn new(columns: Columns) -> Self {
        TabularEngine { columns }
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    fn searchable<'q>(&self, query: &'q TableQuery) -> std::borrow::Cow<'q, [String]> {
        match &query.searchable {
            Some(keys) if !keys.is_empty() => std::borrow::Cow::Borrowed(keys.as_slice()),
            _ => std::borrow::Cow::Owned(self.columns.accessors()),
        }
    }

    /// Search, filter and sort without slicing.
    pub fn process<'a, I>(&self, records: I, query: &TableQuery) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let keys = self.searchable(query);
        let found = search(records, &query.search, &keys);
        let mut rows = apply_column_filters(found, &query.filters);
        sort_rows(&mut rows, &query.sort);
        rows
    }

    pub fn run<'a, I>(&self, records: I, query: &TableQuery) -> PageView<'a>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let rows = self.process(records, query);
        let page = paginate(&rows, query.page, query.page_size);
        let view = PageView {
            rows: page.items.to_vec(),
            current_page: page.current_page,
            page_size: page.page_size,
            total_items: page.total_items,
            total_pages: total_pages(page.total_items, page.page_size),
            active_filters: query.filters.active_count(),
        };
        log::debug!(
            "table query matched {} rows, showing page {}/{}",
            view.total_items,
            view.current_page,
            view.total_pages
        );
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::ColumnDescriptor;
    use crate::sort::SortState;
    use crate::value::{field_text, record, FieldValue};

    fn engine() -> TabularEngine {
        TabularEngine::new(Columns::new(vec![
            ColumnDescriptor::new("iccid", "ICCID"),
            ColumnDescriptor::new("status", "Status"),
            ColumnDescriptor::new("alarm_count", "Alarms"),
        ]))
    }

    fn sims() -> Vec<Record> {
        (0..25)
            .map(|i| {
                record([
                    ("iccid", FieldValue::from(format!("8934{:03}", i))),
                    ("status", (if i % 2 == 0 { "Active" } else { "Test" }).into()),
                    ("alarm_count", FieldValue::Int(i % 5)),
                    ("note", "hidden".into()),
                ])
            })
            .collect()
    }

    fn iccids(rows: &[&Record]) -> Vec<String> {
        rows.iter().map(|r| field_text(r, "iccid").into_owned()).collect()
    }

    #[test]
    fn test_full_pipeline() {
        let rows = sims();
        let mut filters = FilterState::new();
        filters.set("status", ["Active"]);

        let query = TableQuery::new(5)
            .with_search("8934")
            .with_filters(filters)
            .with_sort(SortState::descending("alarm_count"))
            .with_page(1);
        let view = engine().run(&rows, &query);

        assert_eq!(view.total_items, 13);
        assert_eq!(view.total_pages, 3);
        assert_eq!(view.active_filters, 1);
        // alarm_count 4 among even i: 4, 14, 24
        assert_eq!(iccids(&view.rows[..3]), vec!["8934004", "8934014", "8934024"]);
    }

    #[test]
    fn test_default_search_uses_column_accessors() {
        let rows = sims();
        let view = engine().run(&rows, &TableQuery::default().with_search("hidden"));
        assert_eq!(view.total_items, 0);

        let query = TableQuery {
            searchable: Some(vec!["note".to_string()]),
            ..TableQuery::default().with_search("hidden")
        };
        assert_eq!(engine().run(&rows, &query).total_items, 25);
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<Record> = Vec::new();
        let view = engine().run(&rows, &TableQuery::default());
        assert!(view.is_empty());
        assert_eq!(view.total_pages, 1);
        assert!(!view.has_next());
    }

    #[test]
    fn test_page_beyond_end() {
        let rows = sims();
        let view = engine().run(&rows, &TableQuery::new(10).with_page(9));
        assert!(view.is_empty());
        assert_eq!(view.total_pages, 3);
    }

    #[test]
    fn test_sort_applies_before_pagination() {
        let rows = sims();
        let query = TableQuery::new(10).with_sort(SortState::descending("iccid"));
        let view = engine().run(&rows, &query);
        assert_eq!(iccids(&view.rows[..1]), vec!["8934024"]);
    }

    #[test]
    fn test_source_records_unchanged() {
        let rows = sims();
        let before = rows.clone();
        let _ = engine().run(&rows, &TableQuery::new(3).with_sort(SortState::ascending("status")));
        assert_eq!(rows, before);
    }

    #[test]
    fn test_query_deserializes_with_defaults() {
        let query: TableQuery = serde_json::from_str(r#"{"search": "89", "sort": {"key": "iccid"}}"#).unwrap();
        assert_eq!(query.page, 1);
        assert_eq!(query.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(query.sort, SortState::ascending("iccid"));
    }
}
