//! Error types for the ledger simulator
//!
//! # Error Categories
//!
//! - **Lifecycle**: the ledger is closed and accepts no more work
//! - **Integrity**: an audit found the total balance drifted (fatal)
//! - **Addressing**: a transfer named an account that does not exist
//! - **Configuration**: the ledger could not be constructed
//! - **I/O**: a driver runtime could not be started
//!
//! Insufficient funds is deliberately absent: a failed withdrawal is the normal
//! `false` result of [`crate::types::Account::withdraw`], not an error.

use super::account::{AccountId, Balance};
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger has been closed
    ///
    /// This is a recoverable error - the caller should stop issuing transfers.
    /// No state was changed by the rejected call.
    #[error("Ledger is closed")]
    Closed,

    /// The audited total diverged from the expected total
    ///
    /// This is a fatal error. It means the coordination logic is broken, so
    /// it is never retried; the ledger is closed when it is raised.
    #[error("Integrity violation: expected total {expected}, audited total {actual}")]
    IntegrityViolation {
        /// Total fixed at construction
        expected: u128,
        /// Sum of all balances as read by the audit
        actual: u128,
    },

    /// A transfer referenced an account outside `0..num_accounts`
    ///
    /// This is a recoverable error - no state was changed.
    #[error("Unknown account {id} (ledger has {num_accounts} accounts)")]
    UnknownAccount {
        /// The requested account ID
        id: AccountId,
        /// Number of accounts in the ledger
        num_accounts: usize,
    },

    /// The ledger configuration was rejected
    #[error("Invalid ledger configuration: {reason}")]
    InvalidConfig {
        /// Why the configuration was rejected
        reason: String,
    },

    /// I/O error while setting up drivers
    ///
    /// This is a fatal error for the run (thread pool could not be built).
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
    },
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::Io {
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Create an IntegrityViolation error
    pub fn integrity_violation(expected: u128, actual: u128) -> Self {
        LedgerError::IntegrityViolation { expected, actual }
    }

    /// Create an UnknownAccount error
    pub fn unknown_account(id: AccountId, num_accounts: usize) -> Self {
        LedgerError::UnknownAccount { id, num_accounts }
    }

    /// Create an InvalidConfig error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        LedgerError::InvalidConfig {
            reason: reason.into(),
        }
    }

    /// Whether this error means the ledger can no longer be trusted
    pub fn is_fatal(&self) -> bool {
        matches!(self, LedgerError::IntegrityViolation { .. })
    }
}

/// Expected total for a ledger, if it fits in a single [`Balance`]
pub(crate) fn checked_total(num_accounts: usize, initial_balance: Balance) -> Option<Balance> {
    Balance::try_from(num_accounts)
        .ok()
        .and_then(|n| n.checked_mul(initial_balance))
}
