//! Mapping from domain errors to HTTP responses. Bodies are always
//! `{"message": "..."}` with a localized message.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{messages, MessageResponse};
use tracing::{error, warn};

use crate::domain::{AuthError, LedgerError};

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            LedgerError::UnknownLedger(_) => (StatusCode::NOT_FOUND, messages::UNKNOWN_LEDGER),
            LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, messages::RECORD_NOT_FOUND),
            LedgerError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, messages::SERVER_ERROR)
            }
        };
        (status, Json(MessageResponse::new(message))).into_response()
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            AuthError::BadCredentials => messages::SIGNIN_FAILED,
            AuthError::MissingToken | AuthError::InvalidToken => messages::UNAUTHORIZED,
        };
        (StatusCode::UNAUTHORIZED, Json(MessageResponse::new(message))).into_response()
    }
}

/// Response for a request body that does not deserialize.
pub fn invalid_body(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(MessageResponse::new(messages::INVALID_INPUT)),
    )
        .into_response()
}
