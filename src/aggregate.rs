/// Dashtable Aggregation
///
/// Grouping helpers that turn a filtered record set into chart-ready
/// `{name, value}` buckets and KPI numbers. Everything here is pure and is
/// recomputed whenever the filtered set changes.

use crate::value::{FieldValue, Record};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_FALLBACK_LABEL: &str = "Unknown";

/// One chart entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<V = usize> {
    pub name: String,
    pub value: V,
}

impl<V> Bucket<V> {
    pub fn new(name: impl Into<String>, value: V) -> Self {
        Bucket {
            name: name.into(),
            value,
        }
    }
}

/// Grouping key of a record: the stringified field, or `fallback` when the
/// field is missing or falsy.
pub fn group_key(record: &Record, field: &str, fallback: &str) -> String {
    match record.get(field) {
        Some(value) if value.is_truthy() => value.to_text().into_owned(),
        _ => fallback.to_string(),
    }
}

/// Counts records per group, largest group first.
///
/// Ties keep the order in which groups were first encountered.
///
/// ```
/// use dashtable::{group_count, record, Bucket, FieldValue};
///
/// let rows = vec![
///     record([("model", FieldValue::from("X"))]),
///     record([("model", FieldValue::from("X"))]),
///     record([("model", FieldValue::from("Y"))]),
/// ];
/// assert_eq!(group_count(&rows, "model", "Unknown"), vec![Bucket::new("X", 2), Bucket::new("Y", 1)]);
/// ```
pub fn group_count<'a, I>(records: I, field: &str, fallback: &str) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buckets = group_unsorted(records, field, fallback, |_| 1usize, |acc, n| *acc += n);
    // stable sort keeps first-encountered order for ties
    buckets.sort_by(|a, b| b.value.cmp(&a.value));
    buckets
}

/// Sums `value_field` per group, largest total first.
pub fn group_sum<'a, I>(records: I, group_field: &str, value_field: &str, fallback: &str) -> Vec<Bucket<f64>>
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut buckets = group_unsorted(
        records,
        group_field,
        fallback,
        |r| r.get(value_field).map_or(0.0, FieldValue::to_number),
        |acc, n| *acc += n,
    );
    buckets.sort_by(|a, b| b.value.partial_cmp(&a.value).unwrap_or(std::cmp::Ordering::Equal));
    buckets
}

/// Per-group counts in first-encountered order (pie charts that keep the
/// natural order of states).
pub fn group_count_unsorted<'a, I>(records: I, field: &str, fallback: &str) -> Vec<Bucket>
where
    I: IntoIterator<Item = &'a Record>,
{
    group_unsorted(records, field, fallback, |_| 1usize, |acc, n| *acc += n)
}

fn group_unsorted<'a, I, V, M, F>(records: I, field: &str, fallback: &str, map: M, fold: F) -> Vec<Bucket<V>>
where
    I: IntoIterator<Item = &'a Record>,
    M: Fn(&Record) -> V,
    F: Fn(&mut V, V),
{
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut buckets: Vec<Bucket<V>> = Vec::new();

    for record in records {
        let key = group_key(record, field, fallback);
        let value = map(record);
        match index.get(&key).copied() {
            Some(pos) => fold(&mut buckets[pos].value, value),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push(Bucket { name: key, value });
            }
        }
    }

    buckets
}

/// Keeps the `n` first buckets.
pub fn top_n<V>(mut buckets: Vec<Bucket<V>>, n: usize) -> Vec<Bucket<V>> {
    buckets.truncate(n);
    buckets
}

/// Sum of a numeric field; non-numeric values count as 0.
pub fn sum_field<'a, I>(records: I, field: &str) -> f64
where
    I: IntoIterator<Item = &'a Record>,
{
    records
        .into_iter()
        .map(|r| r.get(field).map_or(0.0, FieldValue::to_number))
        .sum()
}

pub fn count_where<'a, I, P>(records: I, predicate: P) -> usize
where
    I: IntoIterator<Item = &'a Record>,
    P: Fn(&Record) -> bool,
{
    records.into_iter().filter(|r| predicate(*r)).count()
}

/// `part / whole * 100`, or 0 when `whole` is 0.
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::record;

    fn pools() -> Vec<Record> {
        vec![
            record([("group", FieldValue::from("Acme")), ("bytes", FieldValue::Int(100))]),
            record([("group", FieldValue::from("Globex")), ("bytes", FieldValue::Int(500))]),
            record([("group", FieldValue::from("Acme")), ("bytes", FieldValue::from("50"))]),
            record([("group", FieldValue::Null), ("bytes", FieldValue::Null)]),
            record([("bytes", FieldValue::Int(1))]),
        ]
    }

    #[test]
    fn test_group_count_descending_with_fallback() {
        let buckets = group_count(&pools(), "group", DEFAULT_FALLBACK_LABEL);
        assert_eq!(
            buckets,
            vec![
                Bucket::new("Acme", 2),
                Bucket::new("Unknown", 2),
                Bucket::new("Globex", 1),
            ]
        );
    }

    #[test]
    fn test_ties_keep_first_seen_order() {
        let rows = vec![
            record([("m", FieldValue::from("b"))]),
            record([("m", FieldValue::from("a"))]),
            record([("m", FieldValue::from("c"))]),
            record([("m", FieldValue::from("a"))]),
        ];
        let names: Vec<String> = group_count(&rows, "m", "?").into_iter().map(|b| b.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);

        let unsorted: Vec<String> = group_count_unsorted(&rows, "m", "?").into_iter().map(|b| b.name).collect();
        assert_eq!(unsorted, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_falsy_values_use_fallback() {
        let rows = vec![
            record([("alarms", FieldValue::Int(0))]),
            record([("alarms", FieldValue::from(""))]),
            record([("alarms", FieldValue::Bool(false))]),
        ];
        assert_eq!(group_count(&rows, "alarms", "N/A"), vec![Bucket::new("N/A", 3)]);
    }

    #[test]
    fn test_group_sum() {
        let buckets = group_sum(&pools(), "group", "bytes", "Unknown");
        assert_eq!(buckets[0], Bucket::new("Globex", 500.0));
        assert_eq!(buckets[1], Bucket::new("Acme", 150.0));
        assert_eq!(buckets[2], Bucket::new("Unknown", 1.0));
    }

    #[test]
    fn test_kpis() {
        let rows = pools();
        assert_eq!(sum_field(&rows, "bytes"), 651.0);
        assert_eq!(count_where(&rows, |r| r.contains_key("group")), 4);
        assert_eq!(percentage(1.0, 4.0), 25.0);
        assert_eq!(percentage(1.0, 0.0), 0.0);
    }

    #[test]
    fn test_top_n() {
        let buckets = group_count(&pools(), "group", "Unknown");
        assert_eq!(top_n(buckets, 1), vec![Bucket::new("Acme", 2)]);
    }
}
