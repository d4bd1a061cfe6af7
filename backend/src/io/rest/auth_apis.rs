//! Sign-in endpoint and the bearer-token middleware.

use axum::{
    extract::{rejection::JsonRejection, Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use shared::SignInRequest;
use tracing::{info, warn};

use super::errors::invalid_body;
use crate::AppState;

/// POST /api/sample/auth/signin
pub async fn sign_in(
    State(state): State<AppState>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };
    info!("POST /api/sample/auth/signin - user: {}", request.user_name);

    match state.auth_service.sign_in(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Rejects requests without a valid `Authorization: Bearer <token>` header.
pub async fn require_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    match state.auth_service.authorize(header.as_deref()).await {
        Ok(session) => {
            info!("{} {} - user: {}", request.method(), request.uri().path(), session.user_name);
            next.run(request).await
        }
        Err(e) => {
            warn!("{} {} rejected: {}", request.method(), request.uri().path(), e);
            e.into_response()
        }
    }
}
