//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: the lockable balance cell and its identifiers
//! - `audit`: snapshots produced by ledger audits
//! - `error`: Error types for the ledger

pub mod account;
pub mod audit;
pub mod error;

pub use account::{Account, AccountId, Balance};
pub use audit::AuditReport;
pub use error::LedgerError;
