//! CSV-backed storage.

pub mod connection;
pub mod ledger_repository;

#[cfg(test)]
pub mod test_utils;

pub use connection::CsvConnection;
pub use ledger_repository::CsvLedgerRepository;
