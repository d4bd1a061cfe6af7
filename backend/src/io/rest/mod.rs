//! # REST API Interface Layer
//!
//! - `POST /api/sample/auth/signin`: exchange credentials for a bearer token
//! - `GET|POST /api/:ledger`: list or create records
//! - `PUT|DELETE /api/:ledger/:key`: update or delete by id or natural key
//!
//! Every ledger route sits behind [`auth_apis::require_auth`].

pub mod auth_apis;
pub mod errors;
pub mod ledger_apis;

pub use auth_apis::*;
pub use errors::*;
pub use ledger_apis::*;
