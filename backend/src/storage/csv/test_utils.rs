//! RAII test environment: every test gets its own temporary data directory,
//! removed when the environment is dropped even if the test panics.

use super::connection::CsvConnection;
use anyhow::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct TestEnvironment {
    /// Kept alive so the directory is not removed before the test ends
    _temp_dir: TempDir,
    pub connection: CsvConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = CsvConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}
