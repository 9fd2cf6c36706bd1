//! Concurrent Ledger Simulator Library
//! # Overview
//!
//! A fixed set of accounts whose balances are mutated by many concurrently
//! running transfers, while a periodic audit verifies that the sum of all
//! balances never drifts from its initial value.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, AuditReport, LedgerError)
//! - [`core`] - Concurrency control:
//!   - [`core::ledger`] - Transfers, the audit protocol and lifecycle
//!   - [`core::traits`] - Driver-facing contract and audit observation
//! - [`strategy`] - Transfer drivers and how they are scheduled
//! - [`io`] - Console output of audit reports
//! - [`cli`] - CLI arguments parsing
//!
//! # Concurrency Model
//!
//! Locking happens at two independent tiers:
//!
//! - **Account**: each account's balance has its own lock, so transfers on
//!   unrelated accounts never contend
//! - **Ledger**: a quiescence gate lets transfers run concurrently with each
//!   other but never with an audit
//!
//! An account lock is never held while taking the gate, and the gate is
//! never held while taking an account lock.
//!
//! # Lifecycle
//!
//! - `OPEN`: transfers run; every Kth completed transfer runs an audit
//! - `AUDITING`: new transfers wait, in-flight transfers drain, balances are read
//! - `CLOSED`: terminal; reached by `close()` or a failed audit

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use crate::core::{AuditObserver, Ledger, LedgerConfig, TransferLedger};
pub use crate::io::{write_audit_report, AuditPrinter};
pub use crate::types::{Account, AccountId, AuditReport, Balance, LedgerError};
