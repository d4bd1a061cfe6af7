use anyhow::Result;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::write_atomically;

/// Durable string key/value store kept in a directory, one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    directory: PathBuf,
}

impl LocalStorage {
    pub fn new(directory: impl AsRef<Path>) -> Self {
        Self {
            directory: directory.as_ref().to_path_buf(),
        }
    }

    fn item_path(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.directory.join(format!("{}.json", safe))
    }

    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        write_atomically(&self.item_path(key), value)
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_remove() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path().join("ls"));

        assert_eq!(storage.get_item("attendanceSystem").unwrap(), None);
        storage.set_item("attendanceSystem", "{\"data\":[]}").unwrap();
        assert_eq!(
            storage.get_item("attendanceSystem").unwrap().as_deref(),
            Some("{\"data\":[]}")
        );

        storage.remove_item("attendanceSystem").unwrap();
        assert_eq!(storage.get_item("attendanceSystem").unwrap(), None);
        // removing twice is fine
        storage.remove_item("attendanceSystem").unwrap();
    }

    #[test]
    fn test_keys_cannot_escape_directory() {
        let temp = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp.path());
        storage.set_item("../outside", "x").unwrap();
        assert!(temp.path().join("___outside.json").exists());
    }
}
