//! Core ledger module
//!
//! This module contains the concurrency-control components:
//! - `traits` - Driver-facing ledger contract and audit observation
//! - `gate` - Quiescence gate (transfer/audit exclusion, lifecycle)
//! - `ledger` - Account ownership, transfers and the audit protocol

mod gate;
pub mod ledger;
pub mod traits;

pub use ledger::{Ledger, LedgerConfig, DEFAULT_AUDIT_PERIOD};
pub use traits::{AuditObserver, TransferLedger};
