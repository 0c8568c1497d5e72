/// Dataset - the record set a view holds
///
/// A view fetches its records once (or again when an upstream filter
/// changes) and keeps them in memory. Two things live here:
///
/// - normalizing whatever JSON the backend returned into a record list
/// - a fetch generation so that a slow, older response can never overwrite
///   the result of a newer one
///
/// # Usage Pattern
///
/// 1. `begin_fetch()` hands out a ticket and marks the dataset loading
/// 2. the caller performs the request
/// 3. `complete(ticket, result)` applies the result if the ticket is still
///    the latest one, otherwise drops it

use crate::error::Result;
use crate::value::{record_from_json, Record};
use serde_json::Value as JsonValue;

/// Keys checked, in order, for the record array of an object payload.
const ENVELOPE_KEYS: [&str; 3] = ["items", "content", "data"];

/// Extracts records from a backend payload.
///
/// Accepts a bare array, an object wrapping the array under `items`,
/// `content` or `data`, or failing that the object's first array field.
/// Array entries that are not objects are skipped. Anything else yields an
/// empty set.
///
/// ```
/// use dashtable::dataset::normalize_payload;
/// use serde_json::json;
///
/// let wrapped = json!({"items": [{"iccid": "1"}, {"iccid": "2"}], "total": 2});
/// assert_eq!(normalize_payload(&wrapped).len(), 2);
/// assert!(normalize_payload(&json!("oops")).is_empty());
/// ```
pub fn normalize_payload(payload: &JsonValue) -> Vec<Record> {
    let items = match payload {
        JsonValue::Array(items) => Some(items),
        JsonValue::Object(map) => ENVELOPE_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(JsonValue::as_array))
            .or_else(|| map.values().find_map(JsonValue::as_array)),
        _ => None,
    };

    match items {
        Some(items) => items.iter().filter_map(record_from_json).collect(),
        None => {
            log::warn!("payload holds no record array, using empty dataset");
            Vec::new()
        }
    }
}

/// Identifies one fetch. Only the most recently issued ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Records replaced
    Applied,
    /// Fetch failed; previous records kept
    Failed,
    /// A newer fetch was started; result ignored
    Stale,
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    loading: bool,
    /// Generation counter, incremented by every `begin_fetch`
    generation: u64,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<Record>) -> Self {
        Dataset {
            records,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket(self.generation)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Applies the result of the fetch identified by `ticket`.
    pub fn complete(&mut self, ticket: FetchTicket, result: Result<Vec<Record>>) -> FetchOutcome {
        if !self.is_current(ticket) {
            log::debug!(
                "discarding stale fetch {} (current generation {})",
                ticket.0,
                self.generation
            );
            return FetchOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(records) => {
                self.records = records;
                FetchOutcome::Applied
            }
            Err(e) => {
                log::error!("fetch failed, keeping {} previous records: {}", self.records.len(), e);
                FetchOutcome::Failed
            }
        }
    }

    /// Shorthand for completing with a raw backend payload.
    pub fn complete_with_payload(&mut self, ticket: FetchTicket, payload: &JsonValue) -> FetchOutcome {
        self.complete(ticket, Ok(normalize_payload(payload)))
    }
}
