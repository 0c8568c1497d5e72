/// Chart payloads
///
/// The shape shared by bar/pie cards and the SIM history endpoint:
/// `{ labels: [...], datasets: [{ label, data, ... }] }`.

use crate::aggregate::Bucket;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

pub const DEFAULT_MAX_ENTRIES: usize = 50;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
    /// Renderer-specific keys (colors, border widths) passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, JsonValue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<ChartDataset>,
}

impl ChartData {
    /// `{labels: [], datasets: []}`, the substitute for a failed history fetch
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty() && self.datasets.iter().all(|d| d.data.is_empty())
    }

    /// Single-series chart from buckets.
    ///
    /// Non-finite values are dropped, entries are ordered largest first and
    /// at most `max(1, max_entries)` are kept.
    pub fn from_buckets<V>(title: &str, buckets: &[Bucket<V>], max_entries: usize) -> Self
    where
        V: Copy + Into<f64>,
    {
        let mut rows: Vec<(&str, f64)> = buckets
            .iter()
            .map(|b| (b.name.as_str(), b.value.into()))
            .filter(|(_, v)| v.is_finite())
            .collect();
        rows.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        rows.truncate(max_entries.max(1));

        let label = if title.is_empty() { "Data" } else { title };
        ChartData {
            labels: rows.iter().map(|(name, _)| name.to_string()).collect(),
            datasets: vec![ChartDataset {
                label: label.to_string(),
                data: rows.iter().map(|(_, v)| *v).collect(),
                extra: Map::new(),
            }],
        }
    }

    /// Position of a label, used to highlight the selected slice or bar.
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Parses a backend chart payload, substituting an empty chart on any
    /// shape mismatch.
    pub fn from_json_or_empty(value: JsonValue) -> Self {
        match serde_json::from_value(value) {
            Ok(chart) => chart,
            Err(e) => {
                log::warn!("unexpected chart payload, using empty chart: {}", e);
                Self::empty()
            }
        }
    }
}

/// Counts are plain `usize`; charts want `f64`.
pub fn count_buckets_as_f64(buckets: &[Bucket]) -> Vec<Bucket<f64>> {
    buckets
        .iter()
        .map(|b| Bucket::new(b.name.clone(), b.value as f64))
        .collect()
}
