//! # REST API for ledgers
//!
//! One set of handlers serves every ledger; the `:ledger` path segment selects
//! the schema, which decides the list envelope and the natural key.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;
use shared::{messages, FinancialRecord};
use tracing::{error, info};

use super::errors::invalid_body;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RecordMessage {
    pub message: String,
    pub data: FinancialRecord,
}

/// GET /api/:ledger
pub async fn list_records(
    State(state): State<AppState>,
    Path(ledger): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/{}", ledger);

    let schema = match state.ledger_service.schema(&ledger) {
        Ok(schema) => schema,
        Err(e) => return e.into_response(),
    };
    match state.ledger_service.list(&ledger).await {
        Ok(records) => (StatusCode::OK, Json(schema.envelope.wrap(&records))).into_response(),
        Err(e) => {
            error!("Failed to list {}: {}", ledger, e);
            e.into_response()
        }
    }
}

/// POST /api/:ledger
pub async fn create_record(
    State(state): State<AppState>,
    Path(ledger): Path<String>,
    payload: Result<Json<FinancialRecord>, JsonRejection>,
) -> impl IntoResponse {
    let Json(record) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };
    info!("POST /api/{} - date: {}", ledger, record.date);

    match state.ledger_service.create(&ledger, record).await {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => {
            error!("Failed to create record in {}: {}", ledger, e);
            e.into_response()
        }
    }
}

/// PUT /api/:ledger/:key
pub async fn update_record(
    State(state): State<AppState>,
    Path((ledger, key)): Path<(String, String)>,
    payload: Result<Json<FinancialRecord>, JsonRejection>,
) -> impl IntoResponse {
    let Json(patch) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return invalid_body(rejection),
    };
    info!("PUT /api/{}/{}", ledger, key);

    match state.ledger_service.update(&ledger, &key, patch).await {
        Ok(record) => (
            StatusCode::OK,
            Json(RecordMessage {
                message: messages::RECORD_UPDATED.to_string(),
                data: record,
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to update {} in {}: {}", key, ledger, e);
            e.into_response()
        }
    }
}

/// DELETE /api/:ledger/:key
pub async fn delete_record(
    State(state): State<AppState>,
    Path((ledger, key)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/{}/{}", ledger, key);

    match state.ledger_service.delete(&ledger, &key).await {
        Ok(()) => (
            StatusCode::OK,
            Json(shared::MessageResponse::new(messages::RECORD_DELETED)),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to delete {} from {}: {}", key, ledger, e);
            e.into_response()
        }
    }
}
