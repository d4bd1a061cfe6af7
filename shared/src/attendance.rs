//! Attendance records, working-hours arithmetic, statistics and the merge
//! rules used by the local attendance cache.
//!
//! Attendance is the only domain without a backend collection: the full record
//! set lives in local storage and is rewritten on every mutation. Two dedup
//! rules keep that set free of duplicates:
//!
//! - **create**: a record with the same natural key (employee name + date) is
//!   replaced, so a first-time entry is idempotent;
//! - **edit**: a record with the same id is replaced, so once assigned the id
//!   is authoritative even if the name or date changed.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    HalfDay,
}

impl AttendanceStatus {
    /// One-letter code used by the compact cookie mirror.
    pub fn code(&self) -> char {
        match self {
            AttendanceStatus::Present => 'p',
            AttendanceStatus::Absent => 'a',
            AttendanceStatus::Late => 'l',
            AttendanceStatus::HalfDay => 'h',
        }
    }

    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'p' => Some(AttendanceStatus::Present),
            'a' => Some(AttendanceStatus::Absent),
            'l' => Some(AttendanceStatus::Late),
            'h' => Some(AttendanceStatus::HalfDay),
            _ => None,
        }
    }

    /// Whether the employee showed up at all.
    pub fn is_attended(&self) -> bool {
        !matches!(self, AttendanceStatus::Absent)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_name: String,
    /// Calendar date (YYYY-MM-DD)
    pub date: String,
    /// HH:MM
    pub check_in_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_out_time: Option<String>,
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub working_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl AttendanceRecord {
    pub fn new(
        employee_name: impl Into<String>,
        date: impl Into<String>,
        check_in_time: impl Into<String>,
        status: AttendanceStatus,
    ) -> Self {
        Self {
            id: Self::generate_id(),
            employee_name: employee_name.into(),
            date: date.into(),
            check_in_time: check_in_time.into(),
            check_out_time: None,
            status,
            working_hours: None,
            notes: None,
        }
    }

    pub fn generate_id() -> String {
        format!("attendance::{}", uuid::Uuid::new_v4())
    }

    /// Derive `working_hours` from the check-in/check-out pair.
    pub fn recompute_working_hours(&mut self) {
        self.working_hours = self
            .check_out_time
            .as_deref()
            .map(|out| calculate_working_hours(&self.check_in_time, out));
    }

    pub fn same_natural_key(&self, other: &AttendanceRecord) -> bool {
        self.employee_name.trim() == other.employee_name.trim() && self.date == other.date
    }
}

fn parse_time(input: &str) -> Option<NaiveTime> {
    let trimmed = input.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .ok()
}

/// Hours between check-in and check-out, rounded to two decimals.
/// Missing or unparseable times and check-outs before check-in give 0.
pub fn calculate_working_hours(check_in: &str, check_out: &str) -> f64 {
    let (Some(start), Some(end)) = (parse_time(check_in), parse_time(check_out)) else {
        return 0.0;
    };
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return 0.0;
    }
    let hours = seconds as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}

/// Replace any record with the same id, then append the edited one.
pub fn merge_edited(
    records: &[AttendanceRecord],
    updated: AttendanceRecord,
) -> Vec<AttendanceRecord> {
    let mut merged: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| r.id != updated.id)
        .cloned()
        .collect();
    merged.push(updated);
    merged
}

/// Replace any record with the same employee name and date, then append the new one.
pub fn merge_created(
    records: &[AttendanceRecord],
    created: AttendanceRecord,
) -> Vec<AttendanceRecord> {
    let mut merged: Vec<AttendanceRecord> = records
        .iter()
        .filter(|r| !r.same_natural_key(&created))
        .cloned()
        .collect();
    merged.push(created);
    merged
}

pub fn remove_by_id(records: &[AttendanceRecord], id: &str) -> Vec<AttendanceRecord> {
    records.iter().filter(|r| r.id != id).cloned().collect()
}

/// Records matching an optional date and an optional employee-name fragment.
pub fn filter_records<'a>(
    records: &'a [AttendanceRecord],
    date: Option<&str>,
    employee: Option<&str>,
) -> Vec<&'a AttendanceRecord> {
    let needle = employee.map(|e| e.trim().to_lowercase()).filter(|e| !e.is_empty());
    records
        .iter()
        .filter(|r| date.map_or(true, |d| r.date == d))
        .filter(|r| {
            needle
                .as_ref()
                .map_or(true, |n| r.employee_name.to_lowercase().contains(n.as_str()))
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttendanceStats {
    pub total_records: usize,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub half_day: usize,
    pub employees: usize,
    /// Present, late or half day
    pub attended: usize,
    pub total_working_hours: f64,
    pub average_working_hours: f64,
    /// Percentage of records where the employee attended (present, late or half day)
    pub attendance_rate: f64,
}

impl AttendanceStats {
    pub fn from_records(records: &[AttendanceRecord]) -> Self {
        let mut stats = AttendanceStats::default();
        let mut employees = BTreeSet::new();
        let mut timed = 0usize;

        for record in records {
            stats.total_records += 1;
            match record.status {
                AttendanceStatus::Present => stats.present += 1,
                AttendanceStatus::Absent => stats.absent += 1,
                AttendanceStatus::Late => stats.late += 1,
                AttendanceStatus::HalfDay => stats.half_day += 1,
            }
            if record.status.is_attended() {
                stats.attended += 1;
            }
            employees.insert(record.employee_name.trim().to_string());
            if let Some(hours) = record.working_hours {
                stats.total_working_hours += hours;
                timed += 1;
            }
        }

        stats.employees = employees.len();
        if timed > 0 {
            stats.average_working_hours = round2(stats.total_working_hours / timed as f64);
        }
        if stats.total_records > 0 {
            let rate = stats.attended as f64 * 100.0 / stats.total_records as f64;
            stats.attendance_rate = round2(rate);
        }
        stats.total_working_hours = round2(stats.total_working_hours);
        stats
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Abbreviated encoding of a record for the size-limited cookie mirror.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompactAttendance {
    pub i: String,
    pub n: String,
    pub d: String,
    pub ci: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub co: Option<String>,
    pub s: char,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub o: Option<String>,
}

impl From<&AttendanceRecord> for CompactAttendance {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            i: record.id.clone(),
            n: record.employee_name.clone(),
            d: record.date.clone(),
            ci: record.check_in_time.clone(),
            co: record.check_out_time.clone(),
            s: record.status.code(),
            h: record.working_hours,
            o: record.notes.clone(),
        }
    }
}

impl CompactAttendance {
    /// Expand back to a full record. Unknown status codes yield `None`.
    pub fn expand(self) -> Option<AttendanceRecord> {
        let status = AttendanceStatus::from_code(self.s)?;
        Some(AttendanceRecord {
            id: self.i,
            employee_name: self.n,
            date: self.d,
            check_in_time: self.ci,
            check_out_time: self.co,
            status,
            working_hours: self.h,
            notes: self.o,
        })
    }
}
