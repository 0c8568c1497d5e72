/// Derived labels
///
/// Small classifiers that turn raw backend fields into the categorical
/// labels the charts group by (usage tier, renewal status, ...). All of them
/// are pure; callers pass "today" in so results are reproducible.

use crate::value::{FieldValue, Record};
use chrono::{DateTime, NaiveDate};

/// Firmware compiled on or after this date counts as current.
pub const FIRMWARE_CUTOFF: (i32, u32, u32) = (2025, 6, 1);

/// Renewals due within this many days are "Expiring".
pub const EXPIRING_WINDOW_DAYS: i64 = 30;

/// Parses `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Quota usage in percent to a pool status.
pub fn pool_status(usage_percent: f64) -> &'static str {
    if usage_percent > 90.0 {
        "Critical"
    } else if usage_percent > 75.0 {
        "High"
    } else {
        "Normal"
    }
}

/// Renewal status of a device from its `date_to_renew`.
///
/// ```
/// use chrono::NaiveDate;
/// use dashtable::labels::renewal_status;
///
/// let today = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert_eq!(renewal_status(None, today), "Undefined");
/// assert_eq!(renewal_status(Some("2025-02-27"), today), "Expired");
/// assert_eq!(renewal_status(Some("2025-03-31"), today), "Expiring");
/// assert_eq!(renewal_status(Some("2025-04-01"), today), "Active");
/// ```
pub fn renewal_status(date_to_renew: Option<&str>, today: NaiveDate) -> &'static str {
    let raw = match date_to_renew.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return "Undefined",
    };
    match parse_date(raw) {
        Some(date) => {
            let days = (date - today).num_days();
            if days < 0 {
                "Expired"
            } else if days <= EXPIRING_WINDOW_DAYS {
                "Expiring"
            } else {
                "Active"
            }
        }
        None => "Active",
    }
}

/// Firmware status from a compilation date.
pub fn firmware_status(compilation_date: Option<&str>) -> &'static str {
    let raw = match compilation_date.map(str::trim) {
        Some(raw) if !raw.is_empty() => raw,
        _ => return "No data",
    };
    let (y, m, d) = FIRMWARE_CUTOFF;
    match (parse_date(raw), NaiveDate::from_ymd_opt(y, m, d)) {
        (Some(date), Some(cutoff)) if date >= cutoff => "Up to date",
        (Some(_), Some(_)) => "Outdated",
        _ => "Unknown",
    }
}

/// Monthly data usage tier in MB. NaN counts as inactive.
pub fn usage_tier(mb: f64) -> &'static str {
    if mb.is_nan() || mb <= 0.0 {
        "Inactive (0 MB)"
    } else if mb < 1.0 {
        "Low (< 1 MB)"
    } else if mb < 10.0 {
        "Medium (1 - 10 MB)"
    } else if mb < 100.0 {
        "High (10 - 100 MB)"
    } else {
        "Extreme (> 100 MB)"
    }
}

fn text_in(value: &FieldValue, accepted: &[&str]) -> bool {
    let text = value.to_text().trim().to_lowercase();
    accepted.contains(&text.as_str())
}

pub fn connection_status(value: &FieldValue) -> &'static str {
    if text_in(value, &["terminado", "online", "connected", "true"]) {
        "Connected"
    } else {
        "Disconnected"
    }
}

pub fn enabled_status(value: &FieldValue) -> &'static str {
    if text_in(value, &["terminado", "asignado", "fabricado", "true", "enabled"]) {
        "Enabled"
    } else {
        "Disabled"
    }
}

/// Human readable byte size in base 1024 (`1536` → `"1.5 KB"`).
pub fn format_bytes(bytes: f64, decimals: usize) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    if !bytes.is_finite() || bytes <= 0.0 {
        return "0 B".to_string();
    }

    let mut scaled = bytes;
    let mut exp = 0;
    while scaled >= 1024.0 && exp < UNITS.len() - 1 {
        scaled /= 1024.0;
        exp += 1;
    }
    let mut text = format!("{:.*}", decimals, scaled);
    if text.contains('.') {
        text.truncate(text.trim_end_matches('0').trim_end_matches('.').len());
    }
    format!("{} {}", text, UNITS[exp])
}

/// Copies of `records` with `field` set to `label(record)`. The source is
/// left untouched.
pub fn with_label<F>(records: &[Record], field: &str, label: F) -> Vec<Record>
where
    F: Fn(&Record) -> String,
{
    records
        .iter()
        .map(|r| {
            let mut enriched = r.clone();
            enriched.insert(field.to_string(), FieldValue::String(label(r)));
            enriched
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::group_count;
    use crate::value::{field_text, record};

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_pool_status_thresholds() {
        assert_eq!(pool_status(95.0), "Critical");
        assert_eq!(pool_status(90.0), "High");
        assert_eq!(pool_status(75.5), "High");
        assert_eq!(pool_status(75.0), "Normal");
    }

    #[test]
    fn test_renewal_status_boundaries() {
        let today = day(2025, 1, 15);
        assert_eq!(renewal_status(Some(""), today), "Undefined");
        assert_eq!(renewal_status(Some("2025-01-15"), today), "Expiring");
        assert_eq!(renewal_status(Some("2025-01-14T23:00:00Z"), today), "Expired");
        assert_eq!(renewal_status(Some("2025-02-14"), today), "Expiring");
        assert_eq!(renewal_status(Some("2025-02-15"), today), "Active");
        assert_eq!(renewal_status(Some("someday"), today), "Active");
    }

    #[test]
    fn test_firmware_status() {
        assert_eq!(firmware_status(Some("2025-06-01")), "Up to date");
        assert_eq!(firmware_status(Some("2024-12-31 10:00:00")), "Outdated");
        assert_eq!(firmware_status(None), "No data");
        assert_eq!(firmware_status(Some("n/a")), "Unknown");
    }

    #[test]
    fn test_usage_tier() {
        assert_eq!(usage_tier(0.0), "Inactive (0 MB)");
        assert_eq!(usage_tier(f64::NAN), "Inactive (0 MB)");
        assert_eq!(usage_tier(0.5), "Low (< 1 MB)");
        assert_eq!(usage_tier(1.0), "Medium (1 - 10 MB)");
        assert_eq!(usage_tier(99.9), "High (10 - 100 MB)");
        assert_eq!(usage_tier(100.0), "Extreme (> 100 MB)");
    }

    #[test]
    fn test_connection_and_enabled() {
        assert_eq!(connection_status(&"Online".into()), "Connected");
        assert_eq!(connection_status(&FieldValue::Bool(true)), "Connected");
        assert_eq!(connection_status(&FieldValue::Null), "Disconnected");
        assert_eq!(enabled_status(&"asignado".into()), "Enabled");
        assert_eq!(enabled_status(&"disabled".into()), "Disabled");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0.0, 2), "0 B");
        assert_eq!(format_bytes(512.0, 2), "512 B");
        assert_eq!(format_bytes(1536.0, 2), "1.5 KB");
        assert_eq!(format_bytes(1048576.0, 2), "1 MB");
        assert_eq!(format_bytes(1234567.0, 0), "1 MB");
        assert_eq!(format_bytes(1024f64.powi(6), 1), "1024 PB");
    }

    #[test]
    fn test_with_label_feeds_grouping() {
        let rows = vec![
            record([("mb", FieldValue::Float(0.2))]),
            record([("mb", FieldValue::Float(42.0))]),
            record([("mb", FieldValue::Float(0.7))]),
        ];
        let labeled = with_label(&rows, "tier", |r| {
            usage_tier(r.get("mb").map_or(0.0, FieldValue::to_number)).to_string()
        });
        assert!(!rows[0].contains_key("tier"));
        assert_eq!(field_text(&labeled[1], "tier"), "High (10 - 100 MB)");

        let buckets = group_count(&labeled, "tier", "Unknown");
        assert_eq!(buckets[0].name, "Low (< 1 MB)");
        assert_eq!(buckets[0].value, 2);
    }
}
