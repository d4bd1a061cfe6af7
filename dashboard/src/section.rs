//! Generic ledger section: table, entry form, summary cards and the
//! create/edit/delete flows, driven entirely by a [`LedgerSchema`].

use crate::client::{LedgerClient, RecordKey};
use crate::error::ClientError;
use crate::notify::{Notifier, Toast};
use chrono::NaiveDate;
use log::{debug, warn};
use shared::{
    format_amount, messages, normalize_date, parse_amount, today, FieldKind, FieldValue,
    FinancialRecord, LedgerSchema, LedgerSummary, Weekday,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("التاريخ مطلوب")]
    MissingDate,
    #[error("تاريخ غير صالح: {0}")]
    InvalidDate(String),
    #[error("الحقل {0} مطلوب")]
    MissingField(&'static str),
    #[error("قيمة غير صالحة في {0}")]
    InvalidAmount(&'static str),
    #[error("يوم غير صالح: {0}")]
    InvalidWeekday(String),
}

/// Raw form inputs, exactly as typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormState {
    pub inputs: BTreeMap<String, String>,
    pub date: String,
    pub notes: String,
}

impl FormState {
    /// Empty form dated today.
    pub fn new(schema: &LedgerSchema) -> Self {
        Self {
            inputs: schema
                .fields
                .iter()
                .map(|f| (f.name.to_string(), String::new()))
                .collect(),
            date: today(),
            notes: String::new(),
        }
    }

    /// Load a record for editing. Numbers are formatted, strings kept verbatim.
    pub fn from_record(schema: &LedgerSchema, record: &FinancialRecord) -> Self {
        let inputs = schema
            .fields
            .iter()
            .map(|f| {
                let value = record.field(f.name).map(FieldValue::to_input).unwrap_or_default();
                (f.name.to_string(), value)
            })
            .collect();
        Self {
            inputs,
            date: normalize_date(&record.date).unwrap_or_else(|| record.date.clone()),
            notes: record.notes.clone().unwrap_or_default(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.inputs.insert(name.to_string(), value.into());
    }

    pub fn input(&self, name: &str) -> &str {
        self.inputs.get(name).map(String::as_str).unwrap_or("")
    }

    /// Total as it would be stamped on submit.
    pub fn live_total(&self, schema: &LedgerSchema) -> f64 {
        schema.calculate_total(&self.field_values(schema))
    }

    pub fn validate(&self, schema: &LedgerSchema) -> Vec<FormError> {
        let mut errors = Vec::new();

        if self.date.trim().is_empty() {
            errors.push(FormError::MissingDate);
        } else if normalize_date(&self.date).is_none() {
            errors.push(FormError::InvalidDate(self.date.clone()));
        }

        for field in &schema.fields {
            let input = self.input(field.name).trim();
            if input.is_empty() {
                if field.required {
                    errors.push(FormError::MissingField(field.label));
                }
                continue;
            }
            match field.kind {
                FieldKind::Amount if parse_amount(input).is_none() => {
                    errors.push(FormError::InvalidAmount(field.label))
                }
                FieldKind::Weekday if Weekday::parse(input).is_none() => {
                    errors.push(FormError::InvalidWeekday(input.to_string()))
                }
                _ => {}
            }
        }
        errors
    }

    fn field_values(&self, schema: &LedgerSchema) -> BTreeMap<String, FieldValue> {
        let mut values = BTreeMap::new();
        for field in &schema.fields {
            let input = self.input(field.name).trim();
            let value = match field.kind {
                FieldKind::Amount => amount_value(input),
                FieldKind::Text if input.is_empty() => None,
                FieldKind::Text => Some(FieldValue::Text(input.to_string())),
                FieldKind::Weekday => self
                    .weekday(input)
                    .map(|day| FieldValue::Text(day.encode(schema.weekday_encoding).to_string())),
            };
            if let Some(value) = value {
                values.insert(field.name.to_string(), value);
            }
        }
        values
    }

    /// Typed weekday, or the date's weekday when left blank.
    fn weekday(&self, input: &str) -> Option<Weekday> {
        if !input.is_empty() {
            return Weekday::parse(input);
        }
        normalize_date(&self.date)
            .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok())
            .map(|d| Weekday::from_date(&d))
    }

    /// Build the record to send, with its total stamped.
    pub fn to_record(&self, schema: &LedgerSchema) -> FinancialRecord {
        let notes = self.notes.trim();
        let mut record = FinancialRecord {
            date: normalize_date(&self.date).unwrap_or_else(|| self.date.trim().to_string()),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
            fields: self.field_values(schema),
            ..FinancialRecord::default()
        };
        schema.stamp_total(&mut record);
        record
    }

    /// Like [`to_record`](Self::to_record), but every field the form holds is
    /// sent. Cleared inputs go out as empty strings so a partial update on
    /// the server overwrites them instead of keeping the old value.
    pub fn to_patch(&self, schema: &LedgerSchema) -> FinancialRecord {
        let mut record = self.to_record(schema);
        for field in &schema.fields {
            record
                .fields
                .entry(field.name.to_string())
                .or_insert_with(|| FieldValue::Text(String::new()));
        }
        record.notes.get_or_insert_with(String::new);
        record
    }
}

/// Empty input is omitted and an explicit zero keeps its typed text, so a
/// deliberate "0" is distinguishable from a blank field on the server.
fn amount_value(input: &str) -> Option<FieldValue> {
    if input.is_empty() {
        return None;
    }
    Some(match parse_amount(input) {
        Some(n) if n == 0.0 => FieldValue::Text(input.to_string()),
        Some(n) => FieldValue::Number(n),
        None => FieldValue::Text(input.to_string()),
    })
}

/// A table row: the record plus its recomputed total.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerRow {
    pub record: FinancialRecord,
    pub total: f64,
    pub formatted_total: String,
}

pub struct LedgerSection {
    schema: LedgerSchema,
    client: LedgerClient,
    notifier: Arc<dyn Notifier>,
    records: Vec<FinancialRecord>,
    form: FormState,
    editing: Option<RecordKey>,
    pending_delete: Option<RecordKey>,
    loading: bool,
}

impl LedgerSection {
    pub fn new(schema: LedgerSchema, client: LedgerClient, notifier: Arc<dyn Notifier>) -> Self {
        let form = FormState::new(&schema);
        Self {
            schema,
            client,
            notifier,
            records: Vec::new(),
            form,
            editing: None,
            pending_delete: None,
            loading: false,
        }
    }

    pub fn schema(&self) -> &LedgerSchema {
        &self.schema
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormState {
        &mut self.form
    }

    pub fn set_input(&mut self, name: &str, value: impl Into<String>) {
        self.form.set(name, value);
    }

    pub fn live_total(&self) -> f64 {
        self.form.live_total(&self.schema)
    }

    pub fn editing(&self) -> Option<&RecordKey> {
        self.editing.as_ref()
    }

    pub fn pending_delete(&self) -> Option<&RecordKey> {
        self.pending_delete.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn report(&self, error: &ClientError) {
        warn!("{} request failed: {}", self.schema.slug, error);
        self.notifier.notify(Toast::error(error.toast_message()));
    }

    /// Initial load.
    pub async fn open(&mut self) -> bool {
        self.refresh().await
    }

    /// Refetch the table. On failure the current rows are kept.
    pub async fn refresh(&mut self) -> bool {
        self.loading = true;
        let result = self.client.list(&self.schema).await;
        self.loading = false;
        match result {
            Ok(records) => {
                debug!("{}: {} records", self.schema.slug, records.len());
                self.records = records;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    /// Load a record into the form; the next submit updates it.
    pub fn begin_edit(&mut self, record: &FinancialRecord) -> bool {
        match RecordKey::for_record(&self.schema, record) {
            Some(key) => {
                self.form = FormState::from_record(&self.schema, record);
                self.editing = Some(key);
                true
            }
            None => {
                self.notifier.notify(Toast::error(messages::RECORD_NOT_FOUND));
                false
            }
        }
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
        self.form = FormState::new(&self.schema);
    }

    /// Validate, then create or update, then refetch.
    pub async fn submit(&mut self) -> bool {
        if let Some(error) = self.form.validate(&self.schema).into_iter().next() {
            self.notifier.notify(Toast::error(error.to_string()));
            return false;
        }

        let result = match &self.editing {
            Some(key) => {
                let patch = self.form.to_patch(&self.schema);
                self.client
                    .update(&self.schema, key, &patch)
                    .await
                    .map(|_| messages::RECORD_UPDATED)
            }
            None => {
                let record = self.form.to_record(&self.schema);
                self.client
                    .create(&self.schema, &record)
                    .await
                    .map(|_| messages::RECORD_CREATED)
            }
        };

        let saved = match result {
            Ok(message) => {
                self.notifier.notify(Toast::success(message));
                self.cancel_edit();
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        };
        self.refresh().await;
        saved
    }

    pub fn request_delete(&mut self, key: RecordKey) {
        self.pending_delete = Some(key);
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the record awaiting confirmation. The table is only refetched
    /// when the server accepted the delete.
    pub async fn confirm_delete(&mut self) -> bool {
        let Some(key) = self.pending_delete.take() else {
            return false;
        };
        match self.client.delete(&self.schema, &key).await {
            Ok(()) => {
                self.notifier.notify(Toast::success(messages::RECORD_DELETED));
                if self.editing.as_ref() == Some(&key) {
                    self.cancel_edit();
                }
                self.refresh().await;
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        }
    }

    pub fn rows(&self) -> Vec<LedgerRow> {
        self.records
            .iter()
            .map(|record| {
                let total = self.schema.total_of(record);
                LedgerRow {
                    record: record.clone(),
                    total,
                    formatted_total: format_amount(total),
                }
            })
            .collect()
    }

    pub fn summary(&self) -> LedgerSummary {
        LedgerSummary::from_records(&self.schema, &self.records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::find_schema;

    fn schema(slug: &str) -> &'static LedgerSchema {
        find_schema(slug).unwrap()
    }

    #[test]
    fn test_explicit_zero_is_kept_as_text() {
        let schema = schema("mahmoud-account");
        let mut form = FormState::new(schema);
        form.date = "2024-03-01".into();
        form.set("cash", "0");
        form.set("blessing", "100");
        form.set("withdrawal", "20");

        assert_eq!(form.live_total(schema), 80.0);
        let record = form.to_record(schema);
        assert_eq!(record.field("cash"), Some(&FieldValue::Text("0".into())));
        assert_eq!(record.field("blessing"), Some(&FieldValue::Number(100.0)));
        assert_eq!(record.total, Some(80.0));
    }

    #[test]
    fn test_empty_inputs_are_omitted() {
        let schema = schema("merchant-account");
        let mut form = FormState::new(schema);
        form.date = "2024-03-01".into();
        form.set("merchantName", "Ali");
        form.set("invoice", "250");

        let record = form.to_record(schema);
        assert!(record.field("payment").is_none());
        assert_eq!(record.text("merchantName"), Some("Ali"));
        assert_eq!(record.notes, None);
        assert_eq!(record.total, Some(250.0));
    }

    #[test]
    fn test_patch_clears_emptied_inputs() {
        let schema = schema("basem-account");
        let record = FinancialRecord::new("2024-03-01")
            .with("cash", 100.0)
            .with("withdrawal", 20.0);
        let mut form = FormState::from_record(schema, &record);
        form.set("withdrawal", "");

        let patch = form.to_patch(schema);
        assert_eq!(patch.field("withdrawal"), Some(&FieldValue::Text(String::new())));
        assert_eq!(patch.field("blessing"), Some(&FieldValue::Text(String::new())));
        assert_eq!(patch.notes.as_deref(), Some(""));
        assert_eq!(patch.total, Some(100.0));
        assert_eq!(schema.total_of(&patch), form.live_total(schema));
    }

    #[test]
    fn test_live_total_tracks_input() {
        let schema = schema("center-delaa-hawanem-account");
        let mut form = FormState::new(schema);
        assert_eq!(form.live_total(schema), 0.0);
        form.set("fixedAfterInventory", "1000");
        assert_eq!(form.live_total(schema), 1000.0);
        form.set("insurance", "150");
        assert_eq!(form.live_total(schema), 850.0);
        form.set("fixedBeforeInventory", "99999");
        assert_eq!(form.live_total(schema), 850.0);
    }

    #[test]
    fn test_validate() {
        let schema = schema("worker-account");
        let mut form = FormState::new(schema);
        form.date = String::new();
        form.set("cash", "abc");

        let errors = form.validate(schema);
        assert!(errors.contains(&FormError::MissingDate));
        assert!(errors.contains(&FormError::MissingField("اسم العامل")));
        assert!(errors.contains(&FormError::InvalidAmount("الكاش")));

        form.date = "01/02/2024".into();
        assert!(form.validate(schema).contains(&FormError::InvalidDate("01/02/2024".into())));

        form.date = "2024-02-01".into();
        form.set("workerName", "Sami");
        form.set("cash", "10");
        assert!(form.validate(schema).is_empty());
    }

    #[test]
    fn test_weekday_encoded_per_schema() {
        // 2024-01-06 was a Saturday
        let gaza = schema("gaza-daily-sales");
        let mut form = FormState::new(gaza);
        form.date = "2024-01-06".into();
        assert_eq!(form.to_record(gaza).text("day"), Some("1"));

        form.set("day", "الأحد");
        assert_eq!(form.to_record(gaza).text("day"), Some("2"));

        let daily = schema("daily-sales");
        let mut form = FormState::new(daily);
        form.date = "2024-01-06".into();
        form.set("day", "7");
        assert_eq!(form.to_record(daily).text("day"), Some("الجمعة"));

        form.set("day", "someday");
        assert!(form
            .validate(daily)
            .contains(&FormError::InvalidWeekday("someday".into())));
    }

    #[test]
    fn test_from_record_formats_numbers_and_keeps_strings() {
        let schema = schema("emad-account");
        let mut record = FinancialRecord::new("2024-01-05T00:00:00Z")
            .with("cash", "0")
            .with("blessing", 12.5)
            .with("withdrawal", 100.0);
        record.notes = Some("n".into());

        let form = FormState::from_record(schema, &record);
        assert_eq!(form.input("cash"), "0");
        assert_eq!(form.input("blessing"), "12.5");
        assert_eq!(form.input("withdrawal"), "100");
        assert_eq!(form.date, "2024-01-05");
        assert_eq!(form.notes, "n");
    }
}
