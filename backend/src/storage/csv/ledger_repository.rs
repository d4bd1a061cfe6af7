use anyhow::{anyhow, Result};
use async_trait::async_trait;
use csv::{Reader, Writer};
use shared::FinancialRecord;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::connection::{CsvConnection, RECORDS_HEADER};
use crate::storage::LedgerStorage;

/// CSV-based ledger repository.
///
/// Each row holds the record id, its creation timestamp and the full record
/// as a JSON document, so ledgers with different field sets share one layout
/// and field values keep their original JSON types.
#[derive(Clone)]
pub struct CsvLedgerRepository {
    connection: CsvConnection,
    // serializes read-modify-write cycles; last write wins across requests
    write_lock: Arc<Mutex<()>>,
}

impl CsvLedgerRepository {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn read_records(&self, ledger: &str) -> Result<Vec<FinancialRecord>> {
        let file_path = self.connection.ensure_records_file_exists(ledger)?;
        let file = File::open(&file_path)?;
        let mut csv_reader = Reader::from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for (line, result) in csv_reader.records().enumerate() {
            let row = result?;
            let id = row.get(0).unwrap_or("");
            let created_at = row.get(1).unwrap_or("");
            let document = row.get(2).unwrap_or("{}");

            let mut record: FinancialRecord = match serde_json::from_str(document) {
                Ok(record) => record,
                Err(e) => {
                    warn!("Skipping malformed row {} in {}: {}", line + 2, file_path.display(), e);
                    continue;
                }
            };
            if !id.is_empty() {
                record.id = Some(id.to_string());
            }
            if record.created_at.is_none() && !created_at.is_empty() {
                record.created_at = Some(created_at.to_string());
            }
            records.push(record);
        }

        Ok(records)
    }

    fn write_records(&self, ledger: &str, records: &[FinancialRecord]) -> Result<()> {
        let file_path = self.connection.ensure_records_file_exists(ledger)?;
        let temp_path = file_path.with_extension("tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)?;
            let mut csv_writer = Writer::from_writer(BufWriter::new(file));

            csv_writer.write_record(RECORDS_HEADER)?;
            for record in records {
                let id = record
                    .id
                    .as_deref()
                    .ok_or_else(|| anyhow!("Refusing to store a record without id"))?;
                let document = serde_json::to_string(record)?;
                let created_at = record.created_at.as_deref().unwrap_or("");
                csv_writer.write_record([id, created_at, document.as_str()])?;
            }
            csv_writer.flush()?;
        }

        std::fs::rename(&temp_path, &file_path)?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStorage for CsvLedgerRepository {
    async fn list_records(&self, ledger: &str) -> Result<Vec<FinancialRecord>> {
        self.read_records(ledger)
    }

    async fn insert_record(&self, ledger: &str, record: &FinancialRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records(ledger)?;
        records.push(record.clone());
        self.write_records(ledger, &records)?;
        info!("Stored record {:?} in {}", record.id, ledger);
        Ok(())
    }

    async fn replace_record(&self, ledger: &str, record: &FinancialRecord) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records(ledger)?;
        let Some(slot) = records.iter_mut().find(|r| r.id == record.id) else {
            return Ok(false);
        };
        *slot = record.clone();
        self.write_records(ledger, &records)?;
        Ok(true)
    }

    async fn delete_record(&self, ledger: &str, id: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.read_records(ledger)?;
        let before = records.len();
        records.retain(|r| r.id.as_deref() != Some(id));
        if records.len() == before {
            return Ok(false);
        }
        self.write_records(ledger, &records)?;
        Ok(true)
    }
}
