/// Drill-down selection
///
/// Clicking a chart bucket narrows the view to the records in that bucket.
/// A view has at most one active drill-down: selecting another dimension
/// replaces the previous one, and clicking the active bucket again clears it.

use crate::aggregate::group_key;
use crate::value::Record;
use serde::{Deserialize, Serialize};

/// The active chart selection: a field, the clicked bucket label, and the
/// fallback label the chart used for missing values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillSelection {
    pub field: String,
    pub value: String,
    pub fallback: String,
}

impl DrillSelection {
    /// Matches with the same key the chart grouped by, so selecting the
    /// fallback bucket selects the records without a value.
    pub fn matches(&self, record: &Record) -> bool {
        group_key(record, &self.field, &self.fallback) == self.value
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillDown {
    active: Option<DrillSelection>,
}

impl DrillDown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handles a chart click. Returns true if a selection is active afterwards.
    ///
    /// ```
    /// use dashtable::DrillDown;
    ///
    /// let mut drill = DrillDown::new();
    /// assert!(drill.select("model", "KW-1", "Unknown"));
    /// assert!(drill.select("status_clean", "Active", "Unknown"));
    /// assert_eq!(drill.active().unwrap().field, "status_clean");
    /// // clicking the same bucket again returns to "none selected"
    /// assert!(!drill.select("status_clean", "Active", "Unknown"));
    /// ```
    pub fn select(&mut self, field: &str, value: &str, fallback: &str) -> bool {
        let same = self
            .active
            .as_ref()
            .map_or(false, |s| s.field == field && s.value == value);
        if same {
            self.active = None;
        } else {
            self.active = Some(DrillSelection {
                field: field.to_string(),
                value: value.to_string(),
                fallback: fallback.to_string(),
            });
        }
        self.active.is_some()
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<&DrillSelection> {
        self.active.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Selected label for `field`, for highlighting the chart that owns it.
    pub fn selected_label(&self, field: &str) -> Option<&str> {
        self.active
            .as_ref()
            .filter(|s| s.field == field)
            .map(|s| s.value.as_str())
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.active.as_ref().map_or(true, |s| s.matches(record))
    }

    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a Record>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}
