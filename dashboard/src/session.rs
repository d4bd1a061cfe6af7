//! Session context (bearer token and role).
//!
//! The token is looked up again on every request, so signing out in one view
//! takes effect everywhere without any refresh logic.

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub token: Option<String>,
    pub role: Option<String>,
}

impl SessionContext {
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            role: Some(role.into()),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The bearer token, or `SessionExpired` when there is none.
    pub fn require_token(&self) -> ClientResult<&str> {
        self.token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(ClientError::SessionExpired)
    }

    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin")
    }
}

/// Source of the current session, read on every request.
pub trait SessionProvider: Send + Sync {
    fn session(&self) -> SessionContext;
}

impl SessionProvider for SessionContext {
    fn session(&self) -> SessionContext {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_token() {
        assert!(matches!(
            SessionContext::anonymous().require_token(),
            Err(ClientError::SessionExpired)
        ));
        let blank = SessionContext {
            token: Some("  ".into()),
            role: None,
        };
        assert!(blank.require_token().is_err());
        assert_eq!(SessionContext::new("t", "user").require_token().unwrap(), "t");
    }

    #[test]
    fn test_is_admin() {
        assert!(SessionContext::new("t", "admin").is_admin());
        assert!(!SessionContext::new("t", "user").is_admin());
        assert!(!SessionContext::anonymous().is_admin());
    }
}
