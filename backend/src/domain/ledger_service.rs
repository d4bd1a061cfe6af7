//! Ledger service: the generic CRUD behind every `/api/<ledger>` endpoint.
//!
//! The service resolves the ledger schema, stamps server-owned fields (`id`,
//! `createdAt`) and recomputes `total` from the schema formula on every write,
//! so a stored total always matches its record's fields.

use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use shared::{find_schema, FinancialRecord, LedgerSchema};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::storage::LedgerStorage;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Unknown ledger: {0}")]
    UnknownLedger(String),
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct LedgerService {
    storage: Arc<dyn LedgerStorage>,
}

impl LedgerService {
    pub fn new(storage: Arc<dyn LedgerStorage>) -> Self {
        Self { storage }
    }

    pub fn schema(&self, ledger: &str) -> Result<&'static LedgerSchema, LedgerError> {
        find_schema(ledger).ok_or_else(|| LedgerError::UnknownLedger(ledger.to_string()))
    }

    pub async fn list(&self, ledger: &str) -> Result<Vec<FinancialRecord>, LedgerError> {
        let schema = self.schema(ledger)?;
        Ok(self.storage.list_records(schema.slug).await?)
    }

    pub async fn create(
        &self,
        ledger: &str,
        mut record: FinancialRecord,
    ) -> Result<FinancialRecord, LedgerError> {
        let schema = self.schema(ledger)?;

        record.id = Some(generate_record_id());
        record.created_at = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        schema.stamp_total(&mut record);

        self.storage.insert_record(schema.slug, &record).await?;
        info!("Created record {:?} in {} (total {:?})", record.id, schema.slug, record.total);
        Ok(record)
    }

    /// Partial update. `key` is matched against the record id first, then
    /// against the ledger's natural key if it has one.
    pub async fn update(
        &self,
        ledger: &str,
        key: &str,
        patch: FinancialRecord,
    ) -> Result<FinancialRecord, LedgerError> {
        let schema = self.schema(ledger)?;
        let records = self.storage.list_records(schema.slug).await?;

        let mut record = find_by_key(schema, &records, key)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(key.to_string()))?;
        record.apply_patch(&patch);
        schema.stamp_total(&mut record);

        if !self.storage.replace_record(schema.slug, &record).await? {
            // deleted between the read and the write
            warn!("Record {} vanished from {} during update", key, schema.slug);
            return Err(LedgerError::NotFound(key.to_string()));
        }
        info!("Updated record {:?} in {}", record.id, schema.slug);
        Ok(record)
    }

    pub async fn delete(&self, ledger: &str, key: &str) -> Result<(), LedgerError> {
        let schema = self.schema(ledger)?;
        let records = self.storage.list_records(schema.slug).await?;

        let id = find_by_key(schema, &records, key)
            .and_then(|r| r.id.clone())
            .ok_or_else(|| LedgerError::NotFound(key.to_string()))?;

        if !self.storage.delete_record(schema.slug, &id).await? {
            return Err(LedgerError::NotFound(key.to_string()));
        }
        info!("Deleted record {} from {}", id, schema.slug);
        Ok(())
    }
}

fn find_by_key<'a>(
    schema: &LedgerSchema,
    records: &'a [FinancialRecord],
    key: &str,
) -> Option<&'a FinancialRecord> {
    let key = key.trim();
    records
        .iter()
        .find(|r| r.id.as_deref() == Some(key))
        .or_else(|| records.iter().find(|r| schema.natural_key_of(r) == Some(key)))
}

fn generate_record_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::csv::test_utils::TestEnvironment;
    use crate::storage::CsvLedgerRepository;
    use shared::FieldValue;

    async fn setup() -> (TestEnvironment, LedgerService) {
        let env = TestEnvironment::new().await.unwrap();
        let repo = CsvLedgerRepository::new(env.connection.clone());
        (env, LedgerService::new(Arc::new(repo)))
    }

    #[tokio::test]
    async fn test_create_stamps_server_fields() {
        let (_env, service) = setup().await;
        let mut input = FinancialRecord::new("2024-03-01")
            .with("cash", "0")
            .with("blessing", 100.0)
            .with("withdrawal", 20.0);
        input.id = Some("client-chosen".into());
        input.total = Some(12345.0);

        let created = service.create("basem-account", input).await.unwrap();
        assert_ne!(created.id.as_deref(), Some("client-chosen"));
        assert!(created.created_at.is_some());
        assert_eq!(created.total, Some(80.0));
        assert_eq!(created.field("cash"), Some(&FieldValue::Text("0".into())));

        let listed = service.list("basem-account").await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn test_unknown_ledger() {
        let (_env, service) = setup().await;
        assert!(matches!(
            service.list("not-a-ledger").await,
            Err(LedgerError::UnknownLedger(_))
        ));
    }

    #[tokio::test]
    async fn test_update_by_id_is_partial_and_recomputes_total() {
        let (_env, service) = setup().await;
        let created = service
            .create(
                "daily-sales",
                FinancialRecord::new("2024-03-01")
                    .with("sold", 1000.0)
                    .with("rent", 100.0)
                    .with("exitName", "كهرباء"),
            )
            .await
            .unwrap();
        let id = created.id.clone().unwrap();

        let patch = FinancialRecord::default().with("exits", 50.0);
        let updated = service.update("daily-sales", &id, patch).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.text("exitName"), Some("كهرباء"));
        assert_eq!(updated.total, Some(850.0));
    }

    #[tokio::test]
    async fn test_update_and_delete_by_natural_key() {
        let (_env, service) = setup().await;
        service
            .create(
                "merchant-account",
                FinancialRecord::new("2024-03-01")
                    .with("merchantName", "أحمد")
                    .with("invoice", 500.0),
            )
            .await
            .unwrap();

        let updated = service
            .update("merchant-account", "أحمد", FinancialRecord::default().with("payment", 200.0))
            .await
            .unwrap();
        assert_eq!(updated.total, Some(300.0));

        service.delete("merchant-account", "أحمد").await.unwrap();
        assert!(service.list("merchant-account").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_natural_key_ignored_for_unkeyed_ledgers() {
        let (_env, service) = setup().await;
        service
            .create("basem-account", FinancialRecord::new("2024-03-01").with("merchantName", "x"))
            .await
            .unwrap();
        assert!(matches!(
            service.delete("basem-account", "x").await,
            Err(LedgerError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_records() {
        let (_env, service) = setup().await;
        assert!(matches!(
            service.update("emad-account", "nope", FinancialRecord::default()).await,
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("emad-account", "nope").await,
            Err(LedgerError::NotFound(_))
        ));
    }
}
