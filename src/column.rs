/// Dashtable Column Descriptors
///
/// A column describes how one record field is shown in a table card: which
/// accessor it reads, the header label, and an optional render function.
/// Columns without an accessor are display-only (no sorting, no filtering,
/// not searchable).

use crate::value::{field_text, Record};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Formatting function from a whole record to its display text
pub type RenderFn = Arc<dyn Fn(&Record) -> String + Send + Sync>;

#[derive(Clone)]
pub struct ColumnDescriptor {
    accessor: Option<String>,
    header: String,
    render: Option<RenderFn>,
}

impl ColumnDescriptor {
    pub fn new(accessor: impl Into<String>, header: impl Into<String>) -> Self {
        ColumnDescriptor {
            accessor: Some(accessor.into()),
            header: header.into(),
            render: None,
        }
    }

    /// A column with no accessor, e.g. an actions column.
    pub fn display_only(header: impl Into<String>) -> Self {
        ColumnDescriptor {
            accessor: None,
            header: header.into(),
            render: None,
        }
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn accessor(&self) -> Option<&str> {
        self.accessor.as_deref()
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    /// Sortable and filterable columns are the ones with an accessor
    pub fn is_sortable(&self) -> bool {
        self.accessor.is_some()
    }

    /// Display text for a cell: the render function if present, otherwise
    /// the stringified field value.
    pub fn display(&self, record: &Record) -> String {
        if let Some(render) = &self.render {
            return render(record);
        }
        match &self.accessor {
            Some(accessor) => field_text(record, accessor).into_owned(),
            None => String::new(),
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("accessor", &self.accessor)
            .field("header", &self.header)
            .field("render", &self.render.is_some())
            .finish()
    }
}

/// Ordered set of columns for one table card.
#[derive(Debug, Clone, Default)]
pub struct Columns {
    columns: Vec<ColumnDescriptor>,
}

impl Columns {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Columns { columns }
    }

    /// One plain column per field seen in `records`, sorted by field name.
    pub fn infer(records: &[Record]) -> Self {
        let names: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| r.keys().map(String::as_str))
            .collect();
        Columns {
            columns: names
                .into_iter()
                .map(|name| ColumnDescriptor::new(name, name))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter()
    }

    pub fn get(&self, accessor: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.accessor() == Some(accessor))
    }

    /// Accessors in column order; the default searchable set.
    pub fn accessors(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter_map(|c| c.accessor.clone())
            .collect()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.header()).collect()
    }

    pub fn render_row(&self, record: &Record) -> Vec<String> {
        self.columns.iter().map(|c| c.display(record)).collect()
    }
}

/// Distinct stringified values of `accessor`, sorted, for a filter dropdown.
/// Records missing the field contribute `""`.
pub fn unique_values<'a, I>(records: I, accessor: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a Record>,
{
    let values: BTreeSet<String> = records
        .into_iter()
        .map(|r| field_text(r, accessor).into_owned())
        .collect();
    values.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{record, FieldValue};

    fn sims() -> Vec<Record> {
        vec![
            record([("iccid", FieldValue::from("8934")), ("status", "Active".into())]),
            record([("iccid", FieldValue::from("8935")), ("status", "Test".into())]),
            record([("iccid", FieldValue::from("8936"))]),
        ]
    }

    #[test]
    fn test_unique_values_sorted_with_empty() {
        let values = unique_values(&sims(), "status");
        assert_eq!(values, vec!["", "Active", "Test"]);
    }

    #[test]
    fn test_render_and_plain_display() {
        let columns = Columns::new(vec![
            ColumnDescriptor::new("iccid", "ICCID"),
            ColumnDescriptor::new("status", "Status")
                .with_render(|r| format!("[{}]", field_text(r, "status"))),
            ColumnDescriptor::display_only("Actions"),
        ]);

        let rows = sims();
        assert_eq!(columns.render_row(&rows[0]), vec!["8934", "[Active]", ""]);
        assert_eq!(columns.accessors(), vec!["iccid", "status"]);
        assert_eq!(columns.headers(), vec!["ICCID", "Status", "Actions"]);
        assert!(!columns.iter().nth(2).unwrap().is_sortable());
    }

    #[test]
    fn test_infer_columns() {
        let columns = Columns::infer(&sims());
        assert_eq!(columns.accessors(), vec!["iccid", "status"]);
        assert!(columns.get("status").is_some());
    }
}
