//! Local attendance persistence.
//!
//! The full collection is written to local storage under
//! [`ATTENDANCE_STORAGE_KEY`]; a compact copy of the newest records and a
//! statistics snapshot are mirrored into cookies as a fallback. Every save
//! broadcasts an [`ChangeEvent`] so other views can reload.
//!
//! Storage failures are logged and never surfaced: a failed save leaves the
//! in-memory state authoritative, and a failed load yields an empty list.

use crate::config::DashboardConfig;
use crate::storage::{CookieJar, LocalStorage, MAX_COOKIE_BYTES};
use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use shared::{AttendanceRecord, AttendanceStats, CompactAttendance};
use tokio::sync::broadcast;

pub const ATTENDANCE_STORAGE_KEY: &str = "attendanceSystem";
pub const ATTENDANCE_DATA_COOKIE: &str = "attendanceData";
pub const ATTENDANCE_STATS_COOKIE: &str = "attendanceStats";
pub const ATTENDANCE_CHANGED_EVENT: &str = "attendanceDataChanged";

/// Newest records mirrored into the data cookie
pub const COOKIE_MIRROR_LIMIT: usize = 20;
const DATA_COOKIE_DAYS: i64 = 365;
const STATS_COOKIE_DAYS: i64 = 7;
const EVENT_CAPACITY: usize = 16;

/// Persistence seam for the attendance ledger.
pub trait LocalLedgerStore: Send + Sync {
    fn load(&self) -> Vec<AttendanceRecord>;

    /// Replace the whole stored collection.
    fn save(&self, records: &[AttendanceRecord]);

    /// Change notifications, for stores that publish them.
    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        None
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub name: &'static str,
    pub count: usize,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredAttendance {
    data: Vec<AttendanceRecord>,
    last_updated: DateTime<Utc>,
}

/// [`LocalLedgerStore`] over [`LocalStorage`] with a [`CookieJar`] mirror.
#[derive(Debug, Clone)]
pub struct BrowserLedgerStore {
    local: LocalStorage,
    cookies: CookieJar,
    events: broadcast::Sender<ChangeEvent>,
}

impl BrowserLedgerStore {
    pub fn new(local: LocalStorage, cookies: CookieJar) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            local,
            cookies,
            events,
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            LocalStorage::new(config.local_storage_dir()),
            CookieJar::new(config.cookie_jar_path()),
        )
    }

    /// Statistics snapshot from the last save, if the cookie is still live.
    pub fn stats_snapshot(&self) -> Option<AttendanceStats> {
        let raw = self.cookies.get(ATTENDANCE_STATS_COOKIE)?;
        serde_json::from_str(&raw)
            .map_err(|e| warn!("Ignoring unreadable attendance stats cookie: {}", e))
            .ok()
    }

    fn load_local(&self) -> Result<Option<Vec<AttendanceRecord>>> {
        let Some(raw) = self.local.get_item(ATTENDANCE_STORAGE_KEY)? else {
            return Ok(None);
        };
        let stored: StoredAttendance = serde_json::from_str(&raw)?;
        Ok(Some(stored.data))
    }

    fn load_cookie(&self) -> Result<Option<Vec<AttendanceRecord>>> {
        let Some(raw) = self.cookies.get(ATTENDANCE_DATA_COOKIE) else {
            return Ok(None);
        };
        let compact: Vec<CompactAttendance> = serde_json::from_str(&raw)?;
        Ok(Some(compact.into_iter().filter_map(CompactAttendance::expand).collect()))
    }

    fn save_local(&self, records: &[AttendanceRecord], now: DateTime<Utc>) -> Result<()> {
        let stored = StoredAttendance {
            data: records.to_vec(),
            last_updated: now,
        };
        self.local
            .set_item(ATTENDANCE_STORAGE_KEY, &serde_json::to_string(&stored)?)
    }

    fn save_cookies(&self, records: &[AttendanceRecord]) -> Result<()> {
        let mirror = compact_mirror(records)?;
        self.cookies
            .set(ATTENDANCE_DATA_COOKIE, &mirror, Duration::days(DATA_COOKIE_DAYS))?;

        let stats = serde_json::to_string(&AttendanceStats::from_records(records))?;
        self.cookies
            .set(ATTENDANCE_STATS_COOKIE, &stats, Duration::days(STATS_COOKIE_DAYS))
    }
}

/// JSON of the newest records in compact form, dropping the oldest until the
/// cookie fits.
fn compact_mirror(records: &[AttendanceRecord]) -> Result<String> {
    let start = records.len().saturating_sub(COOKIE_MIRROR_LIMIT);
    let mut compact: Vec<CompactAttendance> =
        records[start..].iter().map(CompactAttendance::from).collect();
    loop {
        let json = serde_json::to_string(&compact)?;
        if ATTENDANCE_DATA_COOKIE.len() + json.len() <= MAX_COOKIE_BYTES || compact.is_empty() {
            return Ok(json);
        }
        compact.remove(0);
    }
}

impl LocalLedgerStore for BrowserLedgerStore {
    fn load(&self) -> Vec<AttendanceRecord> {
        match self.load_local() {
            Ok(Some(records)) => return records,
            Ok(None) => {}
            Err(e) => warn!("Attendance local storage unreadable, trying cookie: {}", e),
        }
        match self.load_cookie() {
            Ok(Some(records)) => {
                debug!("Loaded {} attendance records from cookie", records.len());
                records
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Attendance cookie unreadable: {}", e);
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[AttendanceRecord]) {
        let now = Utc::now();
        if let Err(e) = self.save_local(records, now) {
            warn!("Failed to save attendance to local storage: {}", e);
        }
        if let Err(e) = self.save_cookies(records) {
            warn!("Failed to mirror attendance into cookies: {}", e);
        }
        // no receivers is not an error
        let _ = self.events.send(ChangeEvent {
            name: ATTENDANCE_CHANGED_EVENT,
            count: records.len(),
            last_updated: now,
        });
    }

    fn subscribe(&self) -> Option<broadcast::Receiver<ChangeEvent>> {
        Some(self.events.subscribe())
    }
}
