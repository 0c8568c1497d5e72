/// Dashtable Sorting
///
/// Single-key, stable sorting for table cards. Numbers compare numerically,
/// everything else compares as lowercased text. Missing and null values
/// always sort after defined values, in both directions.

use crate::value::{field, FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Smallest first
    #[default]
    Ascending,
    /// Largest first
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// The sort column of a table card, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub key: Option<String>,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortState {
    pub fn unsorted() -> Self {
        Self::default()
    }

    pub fn ascending(key: impl Into<String>) -> Self {
        SortState {
            key: Some(key.into()),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(key: impl Into<String>) -> Self {
        SortState {
            key: Some(key.into()),
            direction: SortDirection::Descending,
        }
    }

    /// Header click: the active key flips direction, a new key starts ascending.
    ///
    /// ```
    /// use dashtable::{SortDirection, SortState};
    ///
    /// let mut sort = SortState::unsorted();
    /// sort.request("name");
    /// assert_eq!(sort.direction, SortDirection::Ascending);
    /// sort.request("name");
    /// assert_eq!(sort.direction, SortDirection::Descending);
    /// sort.request("model");
    /// assert_eq!(sort.direction, SortDirection::Ascending);
    /// ```
    pub fn request(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.flipped();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Ascending;
        }
    }

    pub fn is_sorted_by(&self, key: &str) -> bool {
        self.key.as_deref() == Some(key)
    }
}

/// How the defined values of one column compare.
///
/// Chosen once per sort from every value at the key, so the whole column
/// shares one total order even when the backend mixes `12` and `"12"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    /// Every value is a number and none is NaN
    Numeric,
    /// Lowercased stringified values
    Text,
}

impl CompareMode {
    pub fn for_values<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = &'a FieldValue>,
    {
        let numeric = values
            .into_iter()
            .all(|v| v.as_f64().map_or(false, |x| !x.is_nan()));
        if numeric {
            CompareMode::Numeric
        } else {
            CompareMode::Text
        }
    }

    /// Ascending comparison of two defined values.
    pub fn compare(self, a: &FieldValue, b: &FieldValue) -> Ordering {
        if self == CompareMode::Numeric {
            if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
                return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
            }
        }
        a.to_text().to_lowercase().cmp(&b.to_text().to_lowercase())
    }
}

/// Compares two defined values in ascending order.
///
/// Both numeric: numeric comparison (NaN falls back to text). Otherwise the
/// lowercased stringified values are compared. Sorting a column picks one
/// [`CompareMode`] for all rows instead of deciding pair by pair.
pub fn compare_values(a: &FieldValue, b: &FieldValue) -> Ordering {
    CompareMode::for_values([a, b]).compare(a, b)
}

/// Compares two rows on `key`; nulls go last regardless of `direction`.
fn compare_rows(a: &Record, b: &Record, key: &str, mode: CompareMode, direction: SortDirection) -> Ordering {
    match (field(a, key), field(b, key)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => {
            let base = mode.compare(x, y);
            match direction {
                SortDirection::Ascending => base,
                SortDirection::Descending => base.reverse(),
            }
        }
    }
}

/// Stable in-place sort. A state without a key leaves the rows untouched.
pub fn sort_rows(rows: &mut [&Record], sort: &SortState) {
    if let Some(key) = &sort.key {
        let mode = CompareMode::for_values(rows.iter().filter_map(|r| field(r, key)));
        // slice::sort_by is stable; equal keys keep their input order
        rows.sort_by(|a, b| compare_rows(a, b, key, mode, sort.direction));
    }
}

/// Sorted copy of the borrowed rows.
pub fn sort<'a, I>(records: I, sort: &SortState) -> Vec<&'a Record>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut rows: Vec<&'a Record> = records.into_iter().collect();
    sort_rows(&mut rows, sort);
    rows
}
