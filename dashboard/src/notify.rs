//! Toast notifications.
//!
//! Views never talk to a toast widget directly; they report through an
//! injected [`Notifier`], which makes error surfacing observable in tests.

use log::{error, info};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

/// Writes toasts to the log; for headless use.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Error => error!("toast: {}", toast.message),
            _ => info!("toast: {}", toast.message),
        }
    }
}

/// Keeps every toast in memory.
#[derive(Debug, Clone, Default)]
pub struct ToastLog {
    toasts: Arc<Mutex<Vec<Toast>>>,
}

impl ToastLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<Toast> {
        self.toasts.lock().map(|t| t.clone()).unwrap_or_default()
    }

    pub fn last(&self) -> Option<Toast> {
        self.toasts().pop()
    }

    pub fn clear(&self) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.clear();
        }
    }
}

impl Notifier for ToastLog {
    fn notify(&self, toast: Toast) {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(toast);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_log_records_in_order() {
        let log = ToastLog::new();
        log.notify(Toast::success("a"));
        log.notify(Toast::error("b"));
        assert_eq!(log.toasts().len(), 2);
        assert_eq!(log.last(), Some(Toast::error("b")));
        log.clear();
        assert!(log.toasts().is_empty());
    }

    #[test]
    fn test_log_notifier_as_trait_object() {
        let _ = env_logger::builder().is_test(true).try_init();
        let log = ToastLog::new();
        let notifiers: Vec<Arc<dyn Notifier>> = vec![Arc::new(LogNotifier), Arc::new(log.clone())];
        for notifier in &notifiers {
            notifier.notify(Toast::error("فشل"));
            notifier.notify(Toast::success("تم"));
        }
        // clones share one buffer
        assert_eq!(log.toasts(), vec![Toast::error("فشل"), Toast::success("تم")]);
    }
}
