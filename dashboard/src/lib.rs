//! # Center Ledger Dashboard
//!
//! Client-side core of the bookkeeping dashboard, without any rendering.
//!
//! - [`client`]: REST client for the ledger endpoints
//! - [`section`]: generic ledger view-model (form, table, summary, CRUD flows)
//! - [`attendance`]: attendance ledger persisted on the local machine
//! - [`storage`]: file-backed local storage and cookie jar
//!
//! ```text
//! LedgerSection ──> LedgerClient ──HTTP──> backend
//!       │                │
//!       └─> Notifier     └─> SessionProvider (CookieJar)
//!
//! AttendanceLedger ──> LocalLedgerStore (BrowserLedgerStore)
//!                          ├─> LocalStorage
//!                          └─> CookieJar
//! ```

pub mod attendance;
pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod section;
pub mod session;
pub mod storage;

pub use attendance::{
    AttendanceError, AttendanceLedger, BrowserLedgerStore, ChangeEvent, LocalLedgerStore,
};
pub use client::{LedgerClient, RecordKey};
pub use config::DashboardConfig;
pub use error::{ClientError, ClientResult};
pub use notify::{LogNotifier, Notifier, Toast, ToastLevel, ToastLog};
pub use section::{FormError, FormState, LedgerRow, LedgerSection};
pub use session::{SessionContext, SessionProvider};
pub use storage::{CookieJar, LocalStorage};
