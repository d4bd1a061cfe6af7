use chrono::NaiveTime;
use log::info;
use shared::{
    filter_records, merge_created, merge_edited, normalize_date, remove_by_id, AttendanceRecord,
    AttendanceStats, AttendanceStatus,
};
use thiserror::Error;
use tokio::sync::broadcast;

use super::cache::{ChangeEvent, LocalLedgerStore};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    #[error("اسم الموظف مطلوب")]
    EmptyEmployeeName,
    #[error("تاريخ غير صالح: {0}")]
    InvalidDate(String),
    #[error("وقت غير صالح: {0}")]
    InvalidTime(String),
    #[error("سجل الحضور غير موجود: {0}")]
    NotFound(String),
}

fn check_time(input: &str) -> Result<String, AttendanceError> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| AttendanceError::InvalidTime(input.to_string()))
}

fn check_record(record: &mut AttendanceRecord) -> Result<(), AttendanceError> {
    let name = record.employee_name.trim();
    if name.is_empty() {
        return Err(AttendanceError::EmptyEmployeeName);
    }
    record.employee_name = name.to_string();
    record.date = normalize_date(&record.date)
        .ok_or_else(|| AttendanceError::InvalidDate(record.date.clone()))?;
    // absent employees may have no check-in at all
    if record.status.is_attended() || !record.check_in_time.trim().is_empty() {
        record.check_in_time = check_time(&record.check_in_time)?;
    }
    if let Some(out) = record.check_out_time.as_deref() {
        record.check_out_time = Some(check_time(out)?);
    }
    Ok(())
}

/// In-memory attendance collection backed by a [`LocalLedgerStore`].
/// Each mutation saves the full collection.
pub struct AttendanceLedger<S: LocalLedgerStore> {
    store: S,
    records: Vec<AttendanceRecord>,
}

impl<S: LocalLedgerStore> AttendanceLedger<S> {
    pub fn new(store: S) -> Self {
        let records = store.load();
        info!("Loaded {} attendance records", records.len());
        Self { store, records }
    }

    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Re-read the store, e.g. after a change event from another view.
    pub fn reload(&mut self) {
        self.records = self.store.load();
    }

    pub fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        self.store.subscribe()
    }

    fn commit(&mut self, records: Vec<AttendanceRecord>) {
        self.records = records;
        self.store.save(&self.records);
    }

    /// Insert a new record; an existing entry for the same employee and date
    /// is replaced.
    pub fn add(
        &mut self,
        mut record: AttendanceRecord,
    ) -> Result<AttendanceRecord, AttendanceError> {
        check_record(&mut record)?;
        if record.id.trim().is_empty() {
            record.id = AttendanceRecord::generate_id();
        }
        record.recompute_working_hours();
        let merged = merge_created(&self.records, record.clone());
        self.commit(merged);
        Ok(record)
    }

    pub fn check_in(
        &mut self,
        employee_name: &str,
        date: &str,
        time: &str,
        notes: Option<&str>,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let check_in = check_time(time)?;
        let mut record =
            AttendanceRecord::new(employee_name, date, check_in, AttendanceStatus::Present);
        record.notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(str::to_string);
        self.add(record)
    }

    pub fn check_out(&mut self, id: &str, time: &str) -> Result<AttendanceRecord, AttendanceError> {
        let time = check_time(time)?;
        let mut record = self
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| AttendanceError::NotFound(id.to_string()))?;
        record.check_out_time = Some(time);
        self.edit(record)
    }

    /// Replace the record with the same id and recompute its working hours.
    pub fn edit(
        &mut self,
        mut record: AttendanceRecord,
    ) -> Result<AttendanceRecord, AttendanceError> {
        check_record(&mut record)?;
        record.recompute_working_hours();
        let merged = merge_edited(&self.records, record.clone());
        self.commit(merged);
        Ok(record)
    }

    /// Remove a record. Returns false when no record has this id.
    pub fn delete(&mut self, id: &str) -> bool {
        if !self.records.iter().any(|r| r.id == id) {
            return false;
        }
        let remaining = remove_by_id(&self.records, id);
        self.commit(remaining);
        true
    }

    pub fn statistics(&self) -> AttendanceStats {
        AttendanceStats::from_records(&self.records)
    }

    pub fn filter(&self, date: Option<&str>, employee: Option<&str>) -> Vec<&AttendanceRecord> {
        filter_records(&self.records, date, employee)
    }
}
