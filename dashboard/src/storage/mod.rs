//! Browser-style persistence on the local file system.
//!
//! - [`LocalStorage`]: durable key/value store, one file per key
//! - [`CookieJar`]: small named values with an expiry and a size cap

pub mod cookie_jar;
pub mod local_storage;

pub use cookie_jar::{Cookie, CookieJar, MAX_COOKIE_BYTES, ROLE_COOKIE, TOKEN_COOKIE};
pub use local_storage::LocalStorage;

use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Write through a temporary file and rename over the target.
pub(crate) fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("tmp");
    {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)?;
        file.write_all(contents.as_bytes())?;
        file.flush()?;
    }
    fs::rename(&temp_path, path)?;
    Ok(())
}
