use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use super::write_atomically;
use crate::session::{SessionContext, SessionProvider};

/// Browsers refuse cookies larger than this (name + value)
pub const MAX_COOKIE_BYTES: usize = 4096;

pub const TOKEN_COOKIE: &str = "token";
pub const ROLE_COOKIE: &str = "role";

/// Lifetime of the session cookies written at sign-in
const SESSION_COOKIE_DAYS: i64 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cookie {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

/// File-backed cookie jar. Expired cookies read as absent and are dropped on
/// the next write.
#[derive(Debug, Clone)]
pub struct CookieJar {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl CookieJar {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, Cookie>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn modify<F>(&self, change: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, Cookie>),
    {
        let _guard = self.lock.lock().map_err(|_| anyhow!("cookie jar lock poisoned"))?;
        let mut cookies = self.read_all().unwrap_or_else(|e| {
            warn!("Cookie jar unreadable, starting empty: {}", e);
            BTreeMap::new()
        });
        let now = Utc::now();
        cookies.retain(|_, cookie| cookie.expires_at > now);
        change(&mut cookies);
        write_atomically(&self.path, &serde_json::to_string_pretty(&cookies)?)
    }

    /// Set a cookie that expires after `max_age`.
    pub fn set(&self, name: &str, value: &str, max_age: Duration) -> Result<()> {
        self.set_until(name, value, Utc::now() + max_age)
    }

    /// Set a cookie with an absolute expiry. Oversized cookies are rejected.
    pub fn set_until(&self, name: &str, value: &str, expires_at: DateTime<Utc>) -> Result<()> {
        let size = name.len() + value.len();
        if size > MAX_COOKIE_BYTES {
            return Err(anyhow!("Cookie {} is {} bytes, limit is {}", name, size, MAX_COOKIE_BYTES));
        }
        let cookie = Cookie {
            value: value.to_string(),
            expires_at,
        };
        self.modify(|cookies| {
            cookies.insert(name.to_string(), cookie);
        })
    }

    /// Value of a live cookie.
    pub fn get(&self, name: &str) -> Option<String> {
        let cookies = match self.read_all() {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!("Cookie jar unreadable: {}", e);
                return None;
            }
        };
        cookies
            .get(name)
            .filter(|cookie| cookie.expires_at > Utc::now())
            .map(|cookie| cookie.value.clone())
    }

    pub fn remove(&self, name: &str) -> Result<()> {
        self.modify(|cookies| {
            cookies.remove(name);
        })
    }

    /// Store the token and role returned by sign-in.
    pub fn save_session(&self, token: &str, role: &str) -> Result<()> {
        let max_age = Duration::days(SESSION_COOKIE_DAYS);
        self.set(TOKEN_COOKIE, token, max_age)?;
        self.set(ROLE_COOKIE, role, max_age)
    }

    pub fn clear_session(&self) -> Result<()> {
        self.remove(TOKEN_COOKIE)?;
        self.remove(ROLE_COOKIE)
    }
}

impl SessionProvider for CookieJar {
    fn session(&self) -> SessionContext {
        SessionContext {
            token: self.get(TOKEN_COOKIE),
            role: self.get(ROLE_COOKIE),
        }
    }
}
