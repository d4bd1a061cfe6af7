//! # IO Module
//!
//! HTTP interface of the ledger server: request parsing, bearer-token guard,
//! translation of domain errors into `{message}` responses with the matching
//! status code.

pub mod rest;

pub use rest::*;
