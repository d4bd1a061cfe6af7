//! # Storage Traits
//!
//! Storage abstraction used by the domain layer. Each ledger is an independent
//! collection addressed by its slug; the backend implementation decides how
//! collections are laid out on disk.

use anyhow::Result;
use async_trait::async_trait;
use shared::FinancialRecord;

/// Interface for ledger record storage
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// All records of a ledger in insertion order
    async fn list_records(&self, ledger: &str) -> Result<Vec<FinancialRecord>>;

    /// Append a record. The record must already carry its id.
    async fn insert_record(&self, ledger: &str, record: &FinancialRecord) -> Result<()>;

    /// Replace the record with the same id.
    /// Returns false if no such record exists.
    async fn replace_record(&self, ledger: &str, record: &FinancialRecord) -> Result<bool>;

    /// Delete a record by id.
    /// Returns true if the record was found and deleted
    async fn delete_record(&self, ledger: &str, id: &str) -> Result<bool>;
}
