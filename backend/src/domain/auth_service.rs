//! Sign-in against a fixed credential table and bearer-token sessions.
//!
//! Tokens are random and live in memory for [`SESSION_TTL_HOURS`]; a restart
//! signs everybody out.

use chrono::{DateTime, Duration, Utc};
use shared::{messages, SignInRequest, SignInResponse};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub const SESSION_TTL_HOURS: i64 = 24;

struct Credential {
    user_name: &'static str,
    password: &'static str,
    role: &'static str,
}

const CREDENTIALS: [Credential; 2] = [
    Credential {
        user_name: "admin",
        password: "admin123",
        role: "admin",
    },
    Credential {
        user_name: "user",
        password: "user123",
        role: "user",
    },
];

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Bad credentials")]
    BadCredentials,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub user_name: String,
    pub role: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.issued_at > Duration::hours(SESSION_TTL_HOURS)
    }
}

#[derive(Clone, Default)]
pub struct AuthService {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl AuthService {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sign_in(&self, request: &SignInRequest) -> Result<SignInResponse, AuthError> {
        let credential = CREDENTIALS
            .iter()
            .find(|c| c.user_name == request.user_name.trim() && c.password == request.password)
            .ok_or_else(|| {
                warn!("Failed sign-in for user {:?}", request.user_name);
                AuthError::BadCredentials
            })?;

        let now = Utc::now();
        let token = uuid::Uuid::new_v4().simple().to_string();
        let session = Session {
            user_name: credential.user_name.to_string(),
            role: credential.role.to_string(),
            issued_at: now,
        };
        {
            let mut sessions = self.sessions.write().await;
            sessions.retain(|_, s| !s.is_expired(now));
            sessions.insert(token.clone(), session);
        }
        info!("User {} signed in as {}", credential.user_name, credential.role);

        Ok(SignInResponse {
            access_token: token,
            role: credential.role.to_string(),
            message: messages::SIGNIN_SUCCESS.to_string(),
        })
    }

    /// Validate an `Authorization` header value.
    pub async fn authorize(&self, header: Option<&str>) -> Result<Session, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let session = self
            .sessions
            .read()
            .await
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)?;

        if session.is_expired(Utc::now()) {
            self.sessions.write().await.remove(token);
            return Err(AuthError::InvalidToken);
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user: &str, password: &str) -> SignInRequest {
        SignInRequest {
            user_name: user.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_sign_in_and_authorize() {
        let auth = AuthService::new();
        let response = auth.sign_in(&request("admin", "admin123")).await.unwrap();
        assert_eq!(response.role, "admin");
        assert_eq!(response.message, messages::SIGNIN_SUCCESS);

        let header = format!("Bearer {}", response.access_token);
        let session = auth.authorize(Some(&header)).await.unwrap();
        assert_eq!(session.user_name, "admin");
        assert_eq!(session.role, "admin");
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let auth = AuthService::new();
        assert_eq!(
            auth.sign_in(&request("admin", "wrong")).await,
            Err(AuthError::BadCredentials)
        );
        assert_eq!(
            auth.sign_in(&request("ghost", "admin123")).await,
            Err(AuthError::BadCredentials)
        );
    }

    #[tokio::test]
    async fn test_authorize_rejects_missing_and_unknown_tokens() {
        let auth = AuthService::new();
        assert_eq!(auth.authorize(None).await, Err(AuthError::MissingToken));
        assert_eq!(auth.authorize(Some("Bearer ")).await, Err(AuthError::MissingToken));
        assert_eq!(auth.authorize(Some("Token abc")).await, Err(AuthError::MissingToken));
        assert_eq!(auth.authorize(Some("Bearer abc")).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn test_expired_session_is_rejected() {
        let auth = AuthService::new();
        auth.sessions.write().await.insert(
            "old".to_string(),
            Session {
                user_name: "user".to_string(),
                role: "user".to_string(),
                issued_at: Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1),
            },
        );
        assert_eq!(auth.authorize(Some("Bearer old")).await, Err(AuthError::InvalidToken));
        assert!(auth.sessions.read().await.get("old").is_none());
    }

    #[tokio::test]
    async fn test_sign_in_sweeps_expired_sessions() {
        let auth = AuthService::new();
        auth.sessions.write().await.insert(
            "stale".to_string(),
            Session {
                user_name: "admin".to_string(),
                role: "admin".to_string(),
                issued_at: Utc::now() - Duration::hours(SESSION_TTL_HOURS + 1),
            },
        );
        let first = auth.sign_in(&request("user", "user123")).await.unwrap();
        let second = auth.sign_in(&request("admin", "admin123")).await.unwrap();

        let sessions = auth.sessions.read().await;
        assert!(sessions.get("stale").is_none());
        assert!(sessions.contains_key(&first.access_token));
        assert!(sessions.contains_key(&second.access_token));
        assert_eq!(sessions.len(), 2);
    }
}
