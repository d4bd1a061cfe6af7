//! # Domain Module
//!
//! Business logic of the ledger server, independent of HTTP and of the storage
//! backend.
//!
//! - **ledger_service**: generic CRUD over every ledger, keyed by schema slug
//! - **auth_service**: credential check and bearer-token sessions
//!
//! Total formulas and record coercion live in the `shared` crate so that the
//! dashboard computes exactly the same totals.

pub mod auth_service;
pub mod ledger_service;

pub use auth_service::*;
pub use ledger_service::*;
