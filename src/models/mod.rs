//! Data models representing database entities.
//!
//! This module contains all data structures that map to database tables.

/// Ledger account model
pub mod account;
/// Transfer record model
pub mod transaction;
