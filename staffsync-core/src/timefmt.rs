//! Parsing of the date and timestamp formats the backend emits.
//!
//! The backend serializes dates through several layers (database driver,
//! JSON encoder, CSV file), so the same field can arrive as `2021-03-15`,
//! `2021-03-15T00:00:00`, `2021-03-15 08:30:00.123456` or
//! `Mon, 15 Mar 2021 00:00:00 GMT`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::{CalendarDate, Timestamp};

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Values the backend uses to mean "no value".
fn is_blank(raw: &str) -> bool {
    matches!(raw.trim(), "" | "null" | "None" | "undefined")
}

/// Parse a calendar date, keeping only the date part of datetimes.
pub fn parse_calendar_date(raw: &str) -> Option<CalendarDate> {
    if is_blank(raw) {
        return None;
    }
    let raw = raw.trim();
    let date_part = raw.split(['T', ' ']).next().unwrap_or(raw);
    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(date);
    }
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Parse a timestamp. Naive values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<Timestamp> {
    if is_blank(raw) {
        return None;
    }
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    None
}

// ============================================================================
// SERDE ADAPTERS
// ============================================================================

/// Deserialize an optional calendar date. Blank and unparseable values
/// both become `None`; source files carry hand-typed dates.
pub fn optional_date<'de, D>(deserializer: D) -> Result<Option<CalendarDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_calendar_date))
}

/// Deserialize a required timestamp.
pub fn timestamp<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

/// Deserialize an optional timestamp. Blank values become `None`.
pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<Timestamp>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) if is_blank(&raw) => Ok(None),
        Some(raw) => parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    Text(String),
}

/// Deserialize an optional number that may arrive as a JSON string
/// (decimal columns are encoded as strings by some drivers).
pub fn optional_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrString>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(text)) if is_blank(&text) => Ok(None),
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid number '{}'", text))),
    }
}

/// Deserialize a count that may arrive as a number or a numeric string.
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match optional_number(deserializer)? {
        Some(n) if n >= 0.0 && n.fract() == 0.0 => Ok(n as u64),
        Some(n) => Err(serde::de::Error::custom(format!("invalid count {}", n))),
        None => Ok(0),
    }
}

/// Deserialize an optional identifier that may be a JSON number or string.
pub fn optional_identifier<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::String(text)) if is_blank(&text) => Ok(None),
        Some(serde_json::Value::String(text)) => Ok(Some(text)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "invalid identifier {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_calendar_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!(parse_calendar_date("2021-03-15"), Some(expected));
        assert_eq!(parse_calendar_date("2021-03-15T00:00:00"), Some(expected));
        assert_eq!(parse_calendar_date("2021-03-15 08:30:00"), Some(expected));
        assert_eq!(
            parse_calendar_date("Mon, 15 Mar 2021 00:00:00 GMT"),
            Some(expected)
        );
        assert_eq!(parse_calendar_date("None"), None);
        assert_eq!(parse_calendar_date("15/03/2021"), None);
    }

    #[test]
    fn test_timestamp_formats() {
        let ts = parse_timestamp("2024-05-02 14:03:09.123456").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 5, 2));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (14, 3, 9));

        let rfc = parse_timestamp("2024-05-02T14:03:09+02:00").unwrap();
        assert_eq!(rfc.hour(), 12);

        assert!(parse_timestamp("Thu, 02 May 2024 14:03:09 GMT").is_some());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[derive(Deserialize)]
    struct Hired {
        #[serde(default, deserialize_with = "optional_date")]
        date: Option<CalendarDate>,
    }

    #[test]
    fn test_unparseable_date_decodes_as_none() {
        let hired: Hired = serde_json::from_str(r#"{"date": "15/03/2021"}"#).unwrap();
        assert_eq!(hired.date, None);
        let hired: Hired = serde_json::from_str(r#"{"date": null}"#).unwrap();
        assert_eq!(hired.date, None);
        let hired: Hired = serde_json::from_str(r#"{"date": "2021-03-15"}"#).unwrap();
        assert_eq!(hired.date, NaiveDate::from_ymd_opt(2021, 3, 15));
    }
}
