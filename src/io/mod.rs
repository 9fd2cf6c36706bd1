//! I/O module
//!
//! Handles console output of audit reports.
//!
//! # Components
//!
//! - `report` - Audit report formatting and the printing observer

pub mod report;

pub use report::{write_audit_report, AuditPrinter};
