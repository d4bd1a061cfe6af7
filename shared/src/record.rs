//! Flat financial records and the coercion rules applied to their fields.
//!
//! Every ledger domain stores the same shape: an id, a `YYYY-MM-DD` date, optional
//! notes, a derived `total`, and a domain-specific bag of fields. Field values are
//! kept exactly as they arrived on the wire so that an explicit `"0"` string
//! survives a round trip through a form, while arithmetic always goes through
//! [`FieldValue::as_amount`].

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A single field value as received from (or sent to) the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    /// Anything else the server happened to persist (null, bool, nested objects).
    Other(serde_json::Value),
}

impl FieldValue {
    /// Coerce the value to an amount. Empty, `"0"`, non-numeric and non-finite
    /// values all count as zero.
    pub fn as_amount(&self) -> f64 {
        match self {
            FieldValue::Number(n) if n.is_finite() => *n,
            FieldValue::Number(_) => 0.0,
            FieldValue::Text(s) => parse_amount(s).unwrap_or(0.0),
            FieldValue::Other(_) => 0.0,
        }
    }

    /// Text as it should appear in an input box.
    pub fn to_input(&self) -> String {
        match self {
            FieldValue::Number(n) => format_plain(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::Other(serde_json::Value::Null) => String::new(),
            FieldValue::Other(v) => v.to_string(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
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

/// A record in one of the remote ledgers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialRecord {
    #[serde(
        default,
        alias = "_id",
        deserialize_with = "lenient_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Calendar date (YYYY-MM-DD)
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Derived from the other fields by the domain's formula; never edited directly
    #[serde(
        default,
        deserialize_with = "lenient_total",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<f64>,
    /// Stamped by the server on creation (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Domain-specific fields, flattened into the JSON object
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldValue>,
}

impl FinancialRecord {
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            ..Self::default()
        }
    }

    /// Builder-style field setter, mostly useful in tests and fixtures.
    pub fn with(mut self, name: &str, value: impl Into<FieldValue>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    /// Coerced amount of a field; unset fields are zero.
    pub fn amount(&self, name: &str) -> f64 {
        self.fields.get(name).map(FieldValue::as_amount).unwrap_or(0.0)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(FieldValue::as_text)
    }

    pub fn set(&mut self, name: &str, value: FieldValue) {
        self.fields.insert(name.to_string(), value);
    }

    /// Overwrite this record's fields with those present in `patch`.
    /// Absent fields are left untouched.
    pub fn apply_patch(&mut self, patch: &FinancialRecord) {
        if !patch.date.is_empty() {
            self.date = patch.date.clone();
        }
        if patch.notes.is_some() {
            self.notes = patch.notes.clone();
        }
        for (name, value) in &patch.fields {
            self.fields.insert(name.clone(), value.clone());
        }
    }
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        // Mongo-style {"$oid": "..."}
        Some(serde_json::Value::Object(map)) => map
            .get("$oid")
            .and_then(|v| v.as_str())
            .map(str::to_string),
        _ => None,
    })
}

fn lenient_total<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => parse_amount(&s),
        _ => None,
    })
}

/// Parse user or wire input into an amount. Returns `None` for anything that
/// is not a finite number after trimming.
pub fn parse_amount(input: &str) -> Option<f64> {
    let cleaned = input.trim().replace(',', "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Two-decimal display format used by tables and summary cards.
pub fn format_amount(amount: f64) -> String {
    let rounded = (amount * 100.0).round() / 100.0;
    // avoid printing "-0.00"
    if rounded == 0.0 {
        return "0.00".to_string();
    }
    format!("{:.2}", rounded)
}

/// Shortest textual form of a number for an input box ("100", "12.5").
fn format_plain(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

/// Normalize a date to `YYYY-MM-DD`. Accepts plain dates and RFC 3339 timestamps.
pub fn normalize_date(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_value_coercion() {
        assert_eq!(FieldValue::Number(12.5).as_amount(), 12.5);
        assert_eq!(FieldValue::Text("0".into()).as_amount(), 0.0);
        assert_eq!(FieldValue::Text("".into()).as_amount(), 0.0);
        assert_eq!(FieldValue::Text("  42 ".into()).as_amount(), 42.0);
        assert_eq!(FieldValue::Text("1,250".into()).as_amount(), 1250.0);
        assert_eq!(FieldValue::Text("abc".into()).as_amount(), 0.0);
        assert_eq!(FieldValue::Other(json!(null)).as_amount(), 0.0);
        assert_eq!(FieldValue::Number(f64::NAN).as_amount(), 0.0);
    }

    #[test]
    fn test_record_keeps_explicit_zero_string() {
        let raw = json!({
            "_id": "abc",
            "date": "2024-03-01",
            "cash": "0",
            "blessing": 100,
            "withdrawal": 20,
            "total": 80
        });

        let record: FinancialRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.id.as_deref(), Some("abc"));
        assert_eq!(record.field("cash"), Some(&FieldValue::Text("0".into())));
        assert_eq!(record.amount("blessing"), 100.0);
        assert_eq!(record.total, Some(80.0));

        let back = serde_json::to_value(&record).unwrap();
        assert_eq!(back["cash"], json!("0"));
        assert_eq!(back["id"], json!("abc"));
    }

    #[test]
    fn test_record_lenient_id_and_total() {
        let raw = json!({ "id": 7, "date": "2024-03-01", "total": "15.5" });
        let record: FinancialRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.id.as_deref(), Some("7"));
        assert_eq!(record.total, Some(15.5));

        let raw = json!({ "_id": { "$oid": "65f0" }, "date": "2024-03-01", "total": null });
        let record: FinancialRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(record.id.as_deref(), Some("65f0"));
        assert_eq!(record.total, None);
    }

    #[test]
    fn test_apply_patch_is_partial() {
        let mut record = FinancialRecord::new("2024-01-01")
            .with("cash", 10.0)
            .with("blessing", 5.0);
        record.notes = Some("first".into());

        let patch = FinancialRecord::default().with("cash", "0");
        record.apply_patch(&patch);

        assert_eq!(record.date, "2024-01-01");
        assert_eq!(record.notes.as_deref(), Some("first"));
        assert_eq!(record.field("cash"), Some(&FieldValue::Text("0".into())));
        assert_eq!(record.amount("blessing"), 5.0);
    }

    #[test]
    fn test_to_input() {
        assert_eq!(FieldValue::Number(100.0).to_input(), "100");
        assert_eq!(FieldValue::Number(12.5).to_input(), "12.5");
        assert_eq!(FieldValue::Text("0".into()).to_input(), "0");
        assert_eq!(FieldValue::Other(json!(null)).to_input(), "");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(80.0), "80.00");
        assert_eq!(format_amount(-12.346), "-12.35");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date("2024-01-05").as_deref(), Some("2024-01-05"));
        assert_eq!(
            normalize_date("2024-01-05T10:30:00+02:00").as_deref(),
            Some("2024-01-05")
        );
        assert_eq!(normalize_date("05/01/2024"), None);
        assert_eq!(normalize_date(""), None);
    }
}
