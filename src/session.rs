/// View state
///
/// The UI state a dashboard view owns and mutates: dropdown selections,
/// the drill-down, and the table controls. The engine never clamps or resets
/// anything, so the reset rules live here: any change to what is shown sends
/// the table back to page 1.

use crate::aggregate::{group_count, Bucket};
use crate::drilldown::DrillDown;
use crate::engine::{PageView, TableQuery, TabularEngine};
use crate::pagination::total_pages;
use crate::sort::SortState;
use crate::value::{field_text, Record};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// Single-value dropdowns above the charts (organization, model, ...)
    selections: BTreeMap<String, String>,
    drill: DrillDown,
    query: TableQuery,
}

impl ViewState {
    pub fn new(page_size: usize) -> Self {
        ViewState {
            query: TableQuery::new(page_size.max(1)),
            ..Self::default()
        }
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn drill_down(&self) -> &DrillDown {
        &self.drill
    }

    pub fn selection(&self, field: &str) -> Option<&str> {
        self.selections.get(field).map(String::as_str)
    }

    pub fn current_page(&self) -> usize {
        self.query.page
    }

    fn reset_page(&mut self) {
        self.query.page = 1;
    }

    /// Sets or clears (`None`) a dropdown selection. Clears the drill-down.
    pub fn set_selection(&mut self, field: &str, value: Option<&str>) {
        match value {
            Some(v) => {
                self.selections.insert(field.to_string(), v.to_string());
            }
            None => {
                self.selections.remove(field);
            }
        }
        self.drill.clear();
        self.reset_page();
    }

    /// Chart click; see [`DrillDown::select`].
    pub fn drill(&mut self, field: &str, value: &str, fallback: &str) -> bool {
        let active = self.drill.select(field, value, fallback);
        self.reset_page();
        active
    }

    /// "Clear filters": drill-down and column filters.
    pub fn clear_filters(&mut self) {
        self.drill.clear();
        self.query.filters.clear_all();
        self.reset_page();
    }

    pub fn set_search(&mut self, term: &str) {
        if self.query.search != term {
            self.query.search = term.to_string();
            self.reset_page();
        }
    }

    pub fn set_searchable(&mut self, accessors: Option<Vec<String>>) {
        self.query.searchable = accessors;
        self.reset_page();
    }

    pub fn toggle_filter(&mut self, accessor: &str, value: &str) {
        self.query.filters.toggle(accessor, value);
        self.reset_page();
    }

    pub fn clear_filter(&mut self, accessor: &str) {
        self.query.filters.clear(accessor);
        self.reset_page();
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.query.page_size = page_size.max(1);
        self.reset_page();
    }

    /// Header click. Sorting keeps the current page.
    pub fn request_sort(&mut self, key: &str) {
        self.query.sort.request(key);
    }

    pub fn set_sort(&mut self, sort: SortState) {
        self.query.sort = sort;
    }

    /// Jumps to `page`, clamped to `[1, total_pages]` for `total_items` rows.
    pub fn go_to_page(&mut self, page: usize, total_items: usize) {
        let last = total_pages(total_items, self.query.page_size);
        self.query.page = page.clamp(1, last);
    }

    pub fn next_page(&mut self, total_items: usize) {
        let page = self.query.page.saturating_add(1);
        self.go_to_page(page, total_items);
    }

    pub fn previous_page(&mut self, total_items: usize) {
        let page = self.query.page.saturating_sub(1);
        self.go_to_page(page, total_items);
    }

    fn passes_controls(&self, record: &Record) -> bool {
        self.selections
            .iter()
            .all(|(field, value)| field_text(record, field) == value.as_str())
            && self.drill.matches(record)
    }

    /// Records behind the charts: dropdown selections and drill-down only.
    pub fn chart_records<'a, I>(&self, records: I) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records
            .into_iter()
            .filter(|r| self.passes_controls(r))
            .collect()
    }

    /// Table page: the chart records run through the engine.
    pub fn page<'a>(&self, engine: &TabularEngine, records: &'a [Record]) -> PageView<'a> {
        let base = self.chart_records(records);
        engine.run(base, &self.query)
    }

    /// Bucket counts for one chart over [`ViewState::chart_records`].
    pub fn chart(&self, records: &[Record], field: &str, fallback: &str) -> Vec<Bucket> {
        group_count(self.chart_records(records), field, fallback)
    }
}
