//! # Center Ledger Backend
//!
//! REST server behind the bookkeeping dashboard. It exposes one generic set of
//! CRUD endpoints per ledger (centers, people, daily sales, merchants) plus a
//! sign-in endpoint issuing bearer tokens.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (axum handlers, auth middleware)
//!     ↓
//! Domain Layer (LedgerService, AuthService)
//!     ↓
//! Storage Layer (CSV files, one per ledger)
//! ```

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

pub use config::Config;
use domain::{AuthService, LedgerService};
use storage::{CsvConnection, CsvLedgerRepository};

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub ledger_service: LedgerService,
    pub auth_service: AuthService,
}

/// Initialize storage and services
pub async fn initialize_backend(config: &Config) -> Result<AppState> {
    info!("Setting up storage in {}", config.data_dir.display());
    let connection = CsvConnection::new(&config.data_dir)?;
    let repository = CsvLedgerRepository::new(connection);

    info!("Setting up domain services");
    Ok(AppState {
        ledger_service: LedgerService::new(Arc::new(repository)),
        auth_service: AuthService::new(),
    })
}

/// Create the axum router with all routes configured
pub fn create_router(app_state: AppState, config: &Config) -> Result<Router> {
    let origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin {}", config.cors_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let ledger_routes = Router::new()
        .route("/:ledger", get(io::list_records).post(io::create_record))
        .route("/:ledger/:key", put(io::update_record).delete(io::delete_record))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), io::require_auth));

    let api_routes = Router::new()
        .route("/sample/auth/signin", post(io::sign_in))
        .merge(ledger_routes);

    Ok(Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state))
}
