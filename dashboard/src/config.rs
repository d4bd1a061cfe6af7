//! Dashboard configuration.

use log::info;
use std::env;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Backend base URL (e.g. "http://localhost:3000")
    pub base_url: String,
    /// Directory holding the local storage and the cookie jar
    pub data_dir: PathBuf,
}

impl DashboardConfig {
    pub fn new(base_url: impl Into<String>, data_dir: impl AsRef<Path>) -> Self {
        Self {
            base_url: base_url.into(),
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    /// `LEDGER_BASE_URL` and `LEDGER_DASHBOARD_DIR`, with defaults.
    pub fn from_env() -> Self {
        Self {
            base_url: var_or("LEDGER_BASE_URL", "http://localhost:3000"),
            data_dir: PathBuf::from(var_or("LEDGER_DASHBOARD_DIR", "./dashboard-data")),
        }
    }

    pub fn local_storage_dir(&self) -> PathBuf {
        self.data_dir.join("local-storage")
    }

    pub fn cookie_jar_path(&self) -> PathBuf {
        self.data_dir.join("cookies.json")
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}
