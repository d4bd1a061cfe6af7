//! Ledger schemas: the field list, total formula and wire envelope of each domain.
//!
//! Every center, person and merchant ledger follows the same pattern and differs
//! only in which fields it carries and how those fields combine into a signed
//! total. A [`LedgerSchema`] captures that difference as data, so one generic
//! form/table implementation serves all of them.

use crate::record::{FieldValue, FinancialRecord};
use crate::weekday::WeekdayEncoding;
use log::warn;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// How a field participates in the record total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalRole {
    Add,
    Subtract,
    /// Recorded and summed, but not part of the total
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Amount,
    Text,
    Weekday,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub role: TotalRole,
    pub required: bool,
}

impl FieldSchema {
    pub const fn amount(name: &'static str, label: &'static str, role: TotalRole) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Amount,
            role,
            required: false,
        }
    }

    pub const fn text(name: &'static str, label: &'static str, required: bool) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Text,
            role: TotalRole::Ignore,
            required,
        }
    }

    pub const fn weekday(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            kind: FieldKind::Weekday,
            role: TotalRole::Ignore,
            required: false,
        }
    }
}

/// The four total formulas used across the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TotalFormula {
    /// fixedAfterInventory + cashAtHome - withdrawal - insurance
    Inventory,
    /// cash + blessing - withdrawal
    PersonalCash,
    /// sold - rent - expenses - exits
    DailySales,
    /// invoice - payment
    Merchant,
}

impl TotalFormula {
    /// Amount fields of the formula in display order.
    pub fn fields(&self) -> Vec<FieldSchema> {
        use TotalRole::*;
        match self {
            TotalFormula::Inventory => vec![
                FieldSchema::amount("fixedBeforeInventory", "الثابت قبل الجرد", Ignore),
                FieldSchema::amount("fixedAfterInventory", "الثابت بعد الجرد", Add),
                FieldSchema::amount("cashAtHome", "كاش في البيت", Add),
                FieldSchema::amount("withdrawal", "المسحوبات", Subtract),
                FieldSchema::amount("insurance", "التأمين", Subtract),
            ],
            TotalFormula::PersonalCash => vec![
                FieldSchema::amount("cash", "الكاش", Add),
                FieldSchema::amount("blessing", "البركة", Add),
                FieldSchema::amount("withdrawal", "المسحوبات", Subtract),
            ],
            TotalFormula::DailySales => vec![
                FieldSchema::amount("sold", "المباع", Add),
                FieldSchema::amount("rent", "الإيجار", Subtract),
                FieldSchema::amount("expenses", "المصروفات", Subtract),
                FieldSchema::amount("exits", "الخوارج", Subtract),
            ],
            TotalFormula::Merchant => vec![
                FieldSchema::amount("invoice", "الفاتورة", Add),
                FieldSchema::amount("payment", "الدفعة", Subtract),
            ],
        }
    }
}

/// Shape of the list response for a ledger endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Envelope {
    /// `{ "accounts": [...] }`
    Accounts,
    /// `{ "data": [...] }`
    Data,
    /// `[...]`
    Bare,
}

impl Envelope {
    pub fn wrap(&self, records: &[FinancialRecord]) -> serde_json::Value {
        let list =
            serde_json::to_value(records).unwrap_or_else(|_| serde_json::Value::Array(vec![]));
        match self {
            Envelope::Accounts => serde_json::json!({ "accounts": list }),
            Envelope::Data => serde_json::json!({ "data": list }),
            Envelope::Bare => list,
        }
    }

    fn extract<'a>(&self, value: &'a serde_json::Value) -> Option<&'a Vec<serde_json::Value>> {
        match self {
            Envelope::Accounts => value.get("accounts").and_then(|v| v.as_array()),
            Envelope::Data => value.get("data").and_then(|v| v.as_array()),
            Envelope::Bare => value.as_array(),
        }
    }
}

/// Error when a list response matches none of the known envelopes.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionShapeError;

impl fmt::Display for CollectionShapeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Response is not a record collection")
    }
}

impl std::error::Error for CollectionShapeError {}

/// Pull the record list out of a list response. The schema's declared envelope
/// is tried first, then the other known shapes. Entries that are not records
/// are skipped.
pub fn unwrap_collection(
    value: &serde_json::Value,
    declared: Envelope,
) -> Result<Vec<FinancialRecord>, CollectionShapeError> {
    let candidates = [declared, Envelope::Accounts, Envelope::Data, Envelope::Bare];
    let items = candidates
        .iter()
        .find_map(|envelope| envelope.extract(value))
        .ok_or(CollectionShapeError)?;

    let records = items
        .iter()
        .filter_map(|item| match serde_json::from_value::<FinancialRecord>(item.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping malformed record in collection: {}", e);
                None
            }
        })
        .collect();
    Ok(records)
}

/// Everything that distinguishes one ledger from another.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerSchema {
    /// Endpoint path segment, e.g. `worker-account` for `/api/worker-account`
    pub slug: &'static str,
    pub title: &'static str,
    pub formula: TotalFormula,
    pub envelope: Envelope,
    pub fields: Vec<FieldSchema>,
    /// Field used to address a record before (or instead of) its id
    pub natural_key: Option<&'static str>,
    pub weekday_encoding: WeekdayEncoding,
}

impl LedgerSchema {
    pub fn new(slug: &'static str, title: &'static str, formula: TotalFormula) -> Self {
        Self {
            slug,
            title,
            formula,
            envelope: Envelope::Bare,
            fields: formula.fields(),
            natural_key: None,
            weekday_encoding: WeekdayEncoding::ArabicName,
        }
    }

    pub fn envelope(mut self, envelope: Envelope) -> Self {
        self.envelope = envelope;
        self
    }

    /// Add a text field shown before the amount fields.
    pub fn text_field(mut self, name: &'static str, label: &'static str, required: bool) -> Self {
        self.fields.insert(0, FieldSchema::text(name, label, required));
        self
    }

    /// Like `text_field`, and the field becomes the natural key.
    pub fn keyed_by(mut self, name: &'static str, label: &'static str) -> Self {
        self = self.text_field(name, label, true);
        self.natural_key = Some(name);
        self
    }

    pub fn weekday_field(
        mut self,
        name: &'static str,
        label: &'static str,
        encoding: WeekdayEncoding,
    ) -> Self {
        self.fields.insert(0, FieldSchema::weekday(name, label));
        self.weekday_encoding = encoding;
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn amount_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.kind == FieldKind::Amount)
    }

    /// Signed total of a field map.
    pub fn calculate_total(&self, fields: &BTreeMap<String, FieldValue>) -> f64 {
        self.amount_fields().fold(0.0, |total, field| {
            let value = fields.get(field.name).map(FieldValue::as_amount).unwrap_or(0.0);
            match field.role {
                TotalRole::Add => total + value,
                TotalRole::Subtract => total - value,
                TotalRole::Ignore => total,
            }
        })
    }

    pub fn total_of(&self, record: &FinancialRecord) -> f64 {
        self.calculate_total(&record.fields)
    }

    /// Recompute and store the record's total.
    pub fn stamp_total(&self, record: &mut FinancialRecord) {
        record.total = Some(self.total_of(record));
    }

    /// Natural key value of a record, if this ledger has one and it is set.
    pub fn natural_key_of<'a>(&self, record: &'a FinancialRecord) -> Option<&'a str> {
        self.natural_key
            .and_then(|key| record.text(key))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

static REGISTRY: Lazy<Vec<LedgerSchema>> = Lazy::new(|| {
    use TotalFormula::*;
    vec![
        LedgerSchema::new("center-delaa-hawanem-account", "حساب مركز دلع هوانم", Inventory)
            .envelope(Envelope::Accounts),
        LedgerSchema::new(
            "mahmoud-center-delaa-hawanem-account",
            "حساب محمود - مركز دلع هوانم",
            Inventory,
        )
        .envelope(Envelope::Accounts),
        LedgerSchema::new("worker-account", "حساب العمال", PersonalCash)
            .envelope(Envelope::Data)
            .keyed_by("workerName", "اسم العامل"),
        LedgerSchema::new("mahmoud-account", "حساب محمود", PersonalCash),
        LedgerSchema::new("basem-account", "حساب باسم", PersonalCash),
        LedgerSchema::new("waheed-account", "حساب وحيد", PersonalCash),
        LedgerSchema::new("emad-account", "حساب عماد", PersonalCash),
        LedgerSchema::new("daily-sales", "المبيعات اليومية", DailySales)
            .envelope(Envelope::Data)
            .text_field("exitName", "اسم الخارج", false)
            .weekday_field("day", "اليوم", WeekdayEncoding::ArabicName),
        LedgerSchema::new("gaza-daily-sales", "مبيعات غزة اليومية", DailySales)
            .envelope(Envelope::Data)
            .text_field("exitName", "اسم الخارج", false)
            .weekday_field("day", "اليوم", WeekdayEncoding::NumericCode),
        LedgerSchema::new("merchant-account", "حساب التجار", Merchant)
            .keyed_by("merchantName", "اسم التاجر"),
    ]
});

/// All built-in ledgers.
pub fn builtin_schemas() -> &'static [LedgerSchema] {
    &REGISTRY
}

pub fn find_schema(slug: &str) -> Option<&'static LedgerSchema> {
    REGISTRY.iter().find(|schema| schema.slug == slug)
}

/// Aggregate statistics over a ledger's records, as shown in the summary cards.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    pub count: usize,
    pub field_sums: BTreeMap<String, f64>,
    pub total_sum: f64,
    pub average_total: f64,
}

impl LedgerSummary {
    /// Single pass over the full record set. Totals are recomputed rather than
    /// read from the stored `total`.
    pub fn from_records(schema: &LedgerSchema, records: &[FinancialRecord]) -> Self {
        let mut summary = records.iter().fold(LedgerSummary::default(), |mut acc, record| {
            acc.count += 1;
            for field in schema.amount_fields() {
                let sum = acc.field_sums.entry(field.name.to_string()).or_insert(0.0);
                *sum += record.amount(field.name);
            }
            acc.total_sum += schema.total_of(record);
            acc
        });
        if summary.count > 0 {
            summary.average_total = summary.total_sum / summary.count as f64;
        }
        summary
    }

    pub fn sum_of(&self, field: &str) -> f64 {
        self.field_sums.get(field).copied().unwrap_or(0.0)
    }
}
