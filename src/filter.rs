/// Dashtable Filtering
///
/// Two row predicates feed the table pipeline: a free-text search over a set
/// of accessors, and per-column multi-select filters. Both are stable (they
/// never reorder rows) and neither copies records; they return borrowed rows.

use crate::value::{field_text, Record};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Case-insensitive substring search.
///
/// A row matches if any of `accessors` stringifies to a value containing the
/// trimmed, lowercased `term`. An empty or whitespace-only term keeps every row.
///
/// ```
/// use dashtable::{record, search, FieldValue};
///
/// let rows = vec![
///     record([("icc", FieldValue::from("12345"))]),
///     record([("icc", FieldValue::from("67890"))]),
/// ];
/// let hits = search(&rows, "234", &["icc".to_string()]);
/// assert_eq!(hits.len(), 1);
/// ```
pub fn search<'a, I>(records: I, term: &str, accessors: &[String]) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return records.into_iter().collect();
    }

    records
        .into_iter()
        .filter(|row| {
            accessors
                .iter()
                .any(|key| field_text(row, key).to_lowercase().contains(&needle))
        })
        .collect()
}

/// Selected values per column.
///
/// Within a column the selected values are OR-ed; across columns the
/// constraints are AND-ed. A column with an empty selection is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState {
    selected: BTreeMap<String, BTreeSet<String>>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the column's selection, or removes it if already
    /// selected. Removing the last value drops the column constraint.
    pub fn toggle(&mut self, accessor: &str, value: impl Into<String>) {
        let value = value.into();
        let values = self.selected.entry(accessor.to_string()).or_default();
        if !values.remove(&value) {
            values.insert(value);
        }
        if values.is_empty() {
            self.selected.remove(accessor);
        }
    }

    /// Replaces the selection of one column. An empty iterator clears it.
    pub fn set<I, S>(&mut self, accessor: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.selected.remove(accessor);
        } else {
            self.selected.insert(accessor.to_string(), values);
        }
    }

    pub fn clear(&mut self, accessor: &str) {
        self.selected.remove(accessor);
    }

    pub fn clear_all(&mut self) {
        self.selected.clear();
    }

    /// Number of constrained columns (the "N active filters" badge)
    pub fn active_count(&self) -> usize {
        self.selected.values().filter(|v| !v.is_empty()).count()
    }

    pub fn is_active(&self, accessor: &str) -> bool {
        self.selected.get(accessor).map_or(false, |v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.active_count() == 0
    }

    pub fn is_selected(&self, accessor: &str, value: &str) -> bool {
        self.selected
            .get(accessor)
            .map_or(false, |v| v.contains(value))
    }

    pub fn selected(&self, accessor: &str) -> Option<&BTreeSet<String>> {
        self.selected.get(accessor).filter(|v| !v.is_empty())
    }

    /// Active constraints in accessor order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.selected
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.iter()
            .all(|(accessor, values)| values.contains(&*field_text(record, accessor)))
    }
}

/// Keeps rows whose stringified value is selected for every active column.
pub fn apply_column_filters<'a, I>(records: I, filters: &FilterState) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    if filters.is_empty() {
        return records.into_iter().collect();
    }
    records
        .into_iter()
        .filter(|row| filters.matches(row))
        .collect()
}
