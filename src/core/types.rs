use std::cmp::Ordering;
use std::fmt;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde::{Serialize, Deserialize};
use serde_json::Value;

/// External document identifier, as given in the document's `id` key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocId(pub String);

impl DocId {
    pub fn new(id: impl Into<String>) -> Self {
        DocId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Accepts non-empty strings and numbers; anything else is not an id.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(DocId(s.clone())),
            Value::Number(n) => Some(DocId(n.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocId {
    fn from(id: &str) -> Self {
        DocId(id.to_string())
    }
}

impl From<String> for DocId {
    fn from(id: String) -> Self {
        DocId(id)
    }
}

impl From<u64> for DocId {
    fn from(id: u64) -> Self {
        DocId(id.to_string())
    }
}

/// A raw field value as used in field comparison queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(DateTime<FixedOffset>),
    Boolean(bool),
}

impl FieldValue {
    pub fn to_key(&self) -> ValueKey {
        match self {
            FieldValue::Text(s) => ValueKey::new(s.clone()),
            FieldValue::Number(n) => ValueKey::new(format_number(*n)),
            FieldValue::Date(d) => ValueKey::new(format_date(d)),
            FieldValue::Boolean(b) => ValueKey::new(b.to_string()),
        }
    }

    /// Text form handed to tokenizers.
    pub fn as_text(&self) -> String {
        self.to_key().0
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<FixedOffset>> for FieldValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value.fixed_offset())
    }
}

/// Serialized date form used for exact-value keys: `2020-01-01T00:00:00+00:00`.
pub fn format_date(date: &DateTime<FixedOffset>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Parses RFC 3339 timestamps, plus naive `YYYY-MM-DD[ HH:MM:SS]` forms read as UTC.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Some(date);
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Key of an exact-value or facet index.
///
/// Plain decimal numbers sort numerically and before every other key; all
/// other keys sort lexicographically, which keeps RFC 3339 dates in
/// chronological order.
#[derive(Debug, Clone, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueKey(pub String);

impl ValueKey {
    pub fn new(key: impl Into<String>) -> Self {
        ValueKey(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Primitive JSON values only; null, arrays and objects have no key.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(ValueKey(s.clone())),
            Value::Number(n) => Some(ValueKey(n.to_string())),
            Value::Bool(b) => Some(ValueKey(b.to_string())),
            _ => None,
        }
    }

    fn numeric(&self) -> Option<f64> {
        let s = self.0.as_str();
        let digits = s.strip_prefix('-').unwrap_or(s);
        let mut parts = digits.splitn(2, '.');
        let int = parts.next().unwrap_or("");
        let frac = parts.next();
        let valid = !int.is_empty()
            && int.bytes().all(|b| b.is_ascii_digit())
            && frac.is_none_or(|f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
        if valid { s.parse().ok() } else { None }
    }
}

impl PartialEq for ValueKey {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Ord for ValueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.numeric(), other.numeric()) {
            (Some(a), Some(b)) => a.total_cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for ValueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ValueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ValueKey {
    fn from(key: &str) -> Self {
        ValueKey(key.to_string())
    }
}
