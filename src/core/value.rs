use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single field value inside a [`Record`](crate::core::Record).
///
/// Serialized untagged, so a record maps one-to-one onto a JSON object.
/// `Integer` is listed before `Float` so whole JSON numbers stay integral.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean(_) => "BOOLEAN",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Text(_) => "TEXT",
            Self::List(_) => "LIST",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) => {
                if f.is_finite() && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Interpret the value as a point in time, in milliseconds since the epoch.
    ///
    /// Text values are parsed as ISO-8601; plain integers are taken as epoch
    /// milliseconds. Anything else, including unparseable text, yields `None`.
    pub fn as_timestamp_millis(&self) -> Option<i64> {
        match self {
            Self::Text(s) => parse_timestamp_millis(s),
            Self::Integer(ms) => Some(*ms),
            _ => None,
        }
    }
}

/// Parse an ISO-8601 date or date-time into epoch milliseconds (UTC).
///
/// Accepted shapes:
/// - `2024-01-31` (midnight UTC)
/// - `2024-01-31T09:30:00Z` / with offset (RFC 3339)
/// - `2024-01-31T09:30:00` / `2024-01-31T09:30:00.123` (taken as UTC)
pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc().timestamp_millis());
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().timestamp_millis());
    }

    None
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                (a - b).abs() < f64::EPSILON
            }
            (Self::Integer(i), Self::Float(f)) | (Self::Float(f), Self::Integer(i)) => {
                (*i as f64 - f).abs() < f64::EPSILON
            }
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, ""),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::Text(s) => write!(f, "{}", s),
            Self::List(items) => {
                let parts: Vec<String> = items.iter().map(|v| v.to_string()).collect();
                write!(f, "{}", parts.join(", "))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Self::Null)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Self::List(items.into_iter().map(Value::Text).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_float_equality() {
        assert_eq!(Value::Integer(2), Value::Float(2.0));
        assert_ne!(Value::Integer(2), Value::Text("2".into()));
        assert_ne!(Value::Null, Value::Text(String::new()));
    }

    #[test]
    fn test_parse_plain_date_is_utc_midnight() {
        assert_eq!(parse_timestamp_millis("1970-01-02"), Some(86_400_000));
    }

    #[test]
    fn test_parse_rfc3339_and_naive_datetime() {
        let with_zone = parse_timestamp_millis("2024-01-01T00:00:00Z").unwrap();
        let naive = parse_timestamp_millis("2024-01-01T00:00:00").unwrap();
        let date = parse_timestamp_millis("2024-01-01").unwrap();
        assert_eq!(with_zone, naive);
        assert_eq!(naive, date);

        let offset = parse_timestamp_millis("2024-01-01T02:00:00+02:00").unwrap();
        assert_eq!(offset, date);
    }

    #[test]
    fn test_malformed_dates_are_rejected() {
        assert_eq!(parse_timestamp_millis(""), None);
        assert_eq!(parse_timestamp_millis("not a date"), None);
        assert_eq!(parse_timestamp_millis("2024-13-40"), None);
    }

    #[test]
    fn test_json_shape_is_untagged() {
        let values: Vec<Value> = serde_json::from_str(r#"[null, true, 3, 1.5, "x", ["a"]]"#).unwrap();
        assert!(values[0].is_null());
        assert_eq!(values[1], Value::Boolean(true));
        assert!(matches!(values[2], Value::Integer(3)));
        assert!(matches!(values[3], Value::Float(_)));
        assert_eq!(values[4], Value::from("x"));
        assert_eq!(values[5], Value::List(vec![Value::from("a")]));
    }
}
