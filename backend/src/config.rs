//! Runtime configuration read from the environment.

use anyhow::{anyhow, Result};
use std::{env, fmt::Display, net::IpAddr, path::PathBuf, str::FromStr};
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    pub bind: IpAddr,
    pub port: u16,
    /// Root directory holding one sub-directory per ledger
    pub data_dir: PathBuf,
    /// Origin allowed to call the API from a browser
    pub cors_origin: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        Ok(Self {
            bind: try_load("LEDGER_BIND", "127.0.0.1")?,
            port: try_load("LEDGER_PORT", "3000")?,
            data_dir: try_load("LEDGER_DATA_DIR", "./data")?,
            cors_origin: try_load("LEDGER_CORS_ORIGIN", "http://localhost:8080")?,
        })
    }

    /// Defaults with a specific data directory; used by tests and embedders.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            bind: IpAddr::from([127, 0, 0, 1]),
            port: 0,
            data_dir: data_dir.into(),
            cors_origin: "http://localhost:8080".to_string(),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    let raw = env::var(key).unwrap_or_else(|_| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Invalid value for {key}: {e}")
    })
}
