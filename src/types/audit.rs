//! Audit result types
//!
//! An `AuditReport` is the globally consistent snapshot taken by a ledger
//! audit: every balance read exactly once while no transfer was in flight.

use super::account::{AccountId, Balance};

/// Snapshot produced by a single ledger audit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    /// 1-based sequence number of this audit within the ledger's lifetime
    pub sequence: u64,

    /// Completed transfers at the moment the balances were read
    pub transaction_count: u64,

    /// Every account's balance, in account order
    pub balances: Vec<(AccountId, Balance)>,

    /// Sum of `balances`
    pub total: u128,

    /// Total fixed at construction (`num_accounts * initial_balance`)
    pub expected: u128,

    /// Transfers in flight while the balances were read
    ///
    /// Always zero for reports produced by the ledger.
    pub in_flight: usize,
}

impl AuditReport {
    /// Whether the audited total matches the expected total
    pub fn is_balanced(&self) -> bool {
        self.total == self.expected
    }
}
