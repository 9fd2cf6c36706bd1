//! Core traits at the seams between the ledger and its collaborators
//!
//! - [`TransferLedger`] is the contract a transfer driver programs against.
//! - [`AuditObserver`] receives every audit snapshot while the audit still
//!   holds exclusive access.

use crate::types::{AccountId, AuditReport, Balance, LedgerError};

/// Driver-facing ledger interface
///
/// Everything a workload generator needs: issue transfers, watch the
/// lifecycle, and close the ledger when it stops.
pub trait TransferLedger: Send + Sync {
    /// Number of accounts (valid IDs are `0..num_accounts()`)
    fn num_accounts(&self) -> usize;

    /// Move `amount` from `from` to `to`
    ///
    /// Insufficient funds is not an error: the call succeeds without moving
    /// money. May block while an audit is running.
    fn transfer(&self, from: AccountId, to: AccountId, amount: Balance)
        -> Result<(), LedgerError>;

    /// Whether the ledger still accepts transfers
    fn is_open(&self) -> bool;

    /// Close the ledger (idempotent) and release every blocked caller
    fn close(&self);

    /// Number of completed transfers
    fn num_transactions(&self) -> u64;
}

/// Receives audit snapshots
///
/// Called on the thread that runs the audit, before transfers resume.
/// Implementations must not call back into the ledger's `transfer` or
/// `audit`, which would wait on the audit that is calling them.
pub trait AuditObserver: Send + Sync {
    /// Handle a completed audit (balanced or not)
    fn on_audit(&self, report: &AuditReport);
}

impl<F> AuditObserver for F
where
    F: Fn(&AuditReport) + Send + Sync,
{
    fn on_audit(&self, report: &AuditReport) {
        self(report)
    }
}
