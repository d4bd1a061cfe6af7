//! Attendance tracking, kept entirely on the local machine.

pub mod cache;
pub mod ledger;

pub use cache::*;
pub use ledger::*;
