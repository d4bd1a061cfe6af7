//! # Storage Module
//!
//! Persistence for the ledger collections.
//!
//! The domain layer only sees the [`LedgerStorage`] trait; the current
//! implementation keeps one CSV file per ledger under the configured data
//! directory. Writes go through a temporary file and an atomic rename.

pub mod csv;
pub mod traits;

pub use self::csv::{CsvConnection, CsvLedgerRepository};
pub use traits::LedgerStorage;
