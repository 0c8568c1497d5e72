/// Dashtable Value Model
///
/// Records fetched from the dashboard backend are schema-less: each one is a
/// mapping from field name to a primitive value. The engine never interprets
/// specific fields; views decide what `model` or `status_clean` mean.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// One row of domain data (a device, SIM, pool, or firmware entry).
pub type Record = HashMap<String, FieldValue>;

/// A primitive field value as delivered by the backend
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    String(String),
    Bool(bool),
    Null,
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldValue::Int(_) | FieldValue::Float(_))
    }

    /// Returns the numeric value for `Int` and `Float`, `None` otherwise.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(v) => Some(*v as f64),
            FieldValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Loose numeric coercion used by KPI sums: numbers as-is, numeric
    /// strings parsed, booleans as 0/1, everything else (and NaN) as 0.
    pub fn to_number(&self) -> f64 {
        let n = match self {
            FieldValue::Int(v) => *v as f64,
            FieldValue::Float(v) => *v,
            FieldValue::Bool(true) => 1.0,
            FieldValue::String(s) => s.trim().parse::<f64>().unwrap_or(0.0),
            FieldValue::Bool(false) | FieldValue::Null => 0.0,
        };
        if n.is_finite() {
            n
        } else {
            0.0
        }
    }

    /// False for null, empty strings, zero, NaN and `false`.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Int(v) => *v != 0,
            FieldValue::Float(v) => *v != 0.0 && !v.is_nan(),
            FieldValue::String(s) => !s.is_empty(),
        }
    }

    /// Text used for search, column filters and grouping.
    /// `Null` stringifies to the empty string.
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::String(s) => Cow::Borrowed(s.as_str()),
            FieldValue::Null => Cow::Borrowed(""),
            other => Cow::Owned(other.to_string()),
        }
    }

    pub fn from_json(value: &JsonValue) -> FieldValue {
        match value {
            JsonValue::Null => FieldValue::Null,
            JsonValue::Bool(b) => FieldValue::Bool(*b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    FieldValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    FieldValue::Float(f)
                } else {
                    FieldValue::String(n.to_string())
                }
            }
            JsonValue::String(s) => FieldValue::String(s.clone()),
            // Nested structures are opaque to the engine
            nested => FieldValue::String(nested.to_string()),
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Int(v) => JsonValue::Number((*v).into()),
            FieldValue::Float(v) => serde_json::Number::from_f64(*v)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            FieldValue::String(v) => JsonValue::String(v.clone()),
            FieldValue::Bool(v) => JsonValue::Bool(*v),
            FieldValue::Null => JsonValue::Null,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Int(v) => write!(f, "{}", v),
            // f64's Display already drops a zero fraction ("5", not "5.0")
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::String(v) => f.write_str(v),
            FieldValue::Bool(v) => write!(f, "{}", v),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Int(v)
    }
}

impl From<i32> for FieldValue {
    fn from(v: i32) -> Self {
        FieldValue::Int(v as i64)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let json = JsonValue::deserialize(deserializer)?;
        Ok(FieldValue::from_json(&json))
    }
}

/// Returns the value stored under `accessor`, treating `Null` like a missing field.
pub fn field<'a>(record: &'a Record, accessor: &str) -> Option<&'a FieldValue> {
    record.get(accessor).filter(|v| !v.is_null())
}

/// Stringified value of a field; missing and null fields yield `""`.
pub fn field_text<'a>(record: &'a Record, accessor: &str) -> Cow<'a, str> {
    match record.get(accessor) {
        Some(value) => value.to_text(),
        None => Cow::Borrowed(""),
    }
}

/// Converts a JSON object into a record. Returns `None` for non-objects.
pub fn record_from_json(value: &JsonValue) -> Option<Record> {
    let object = value.as_object()?;
    Some(
        object
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::from_json(v)))
            .collect(),
    )
}

pub fn record_to_json(record: &Record) -> HashMap<String, JsonValue> {
    record.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

/// Builds a record from `(field, value)` pairs.
///
/// ```
/// use dashtable::{record, FieldValue};
///
/// let r = record([("icc", FieldValue::from("12345")), ("alarm_count", 2.into())]);
/// assert_eq!(r.len(), 2);
/// ```
pub fn record<K, I>(pairs: I) -> Record
where
    K: Into<String>,
    I: IntoIterator<Item = (K, FieldValue)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
