//! Client error types

use shared::messages;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// No token cookie; raised before any request is made
    #[error("Session expired")]
    SessionExpired,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Localized text shown to the user.
    pub fn toast_message(&self) -> String {
        match self {
            ClientError::SessionExpired => messages::SESSION_EXPIRED.to_string(),
            ClientError::Unauthorized(_) => messages::UNAUTHORIZED.to_string(),
            ClientError::NotFound(_) => messages::RECORD_NOT_FOUND.to_string(),
            ClientError::Validation(msg) if !msg.is_empty() => msg.clone(),
            ClientError::Validation(_) => messages::INVALID_INPUT.to_string(),
            ClientError::Server(_) => messages::SERVER_ERROR.to_string(),
            ClientError::Http(_)
            | ClientError::Serialization(_)
            | ClientError::InvalidResponse(_)
            | ClientError::InvalidUrl(_) => messages::NETWORK_ERROR.to_string(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
