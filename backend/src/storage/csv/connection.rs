use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const RECORDS_FILE: &str = "records.csv";
pub const RECORDS_HEADER: [&str; 3] = ["id", "created_at", "document"];

/// CsvConnection owns the data directory and the per-ledger file layout:
/// `<base>/<ledger>/records.csv`
#[derive(Debug, Clone)]
pub struct CsvConnection {
    base_directory: PathBuf,
}

impl CsvConnection {
    /// Create a new CSV connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        if !base_path.exists() {
            info!("Creating data directory {}", base_path.display());
            fs::create_dir_all(&base_path)?;
        }

        Ok(Self {
            base_directory: base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// Directory names are restricted to lowercase alphanumerics, `-` and `_`
    pub fn generate_safe_directory_name(ledger: &str) -> String {
        let safe: String = ledger
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect();
        if safe.is_empty() {
            "unnamed".to_string()
        } else {
            safe
        }
    }

    pub fn ledger_directory(&self, ledger: &str) -> PathBuf {
        self.base_directory.join(Self::generate_safe_directory_name(ledger))
    }

    pub fn records_file_path(&self, ledger: &str) -> PathBuf {
        self.ledger_directory(ledger).join(RECORDS_FILE)
    }

    /// Ensure the ledger's CSV file exists with its header row
    pub fn ensure_records_file_exists(&self, ledger: &str) -> Result<PathBuf> {
        let dir = self.ledger_directory(ledger);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let file_path = dir.join(RECORDS_FILE);
        if !file_path.exists() {
            let header = format!("{}\n", RECORDS_HEADER.join(","));
            fs::write(&file_path, header)?;
            info!("Created ledger file {}", file_path.display());
        }
        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_safe_directory_name() {
        assert_eq!(CsvConnection::generate_safe_directory_name("worker-account"), "worker-account");
        assert_eq!(CsvConnection::generate_safe_directory_name("../etc"), "___etc");
        assert_eq!(CsvConnection::generate_safe_directory_name("Daily Sales"), "daily_sales");
        assert_eq!(CsvConnection::generate_safe_directory_name("  "), "unnamed");
    }

    #[test]
    fn test_ensure_records_file_writes_header() {
        let temp = TempDir::new().unwrap();
        let connection = CsvConnection::new(temp.path().join("nested")).unwrap();

        let path = connection.ensure_records_file_exists("basem-account").unwrap();
        assert!(path.ends_with("basem-account/records.csv"));
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "id,created_at,document\n");

        // second call leaves the file alone
        fs::write(&path, "id,created_at,document\nx,y,{}\n").unwrap();
        connection.ensure_records_file_exists("basem-account").unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("x,y"));
    }
}
