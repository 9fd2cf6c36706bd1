//! Quiescence gate coordinating transfers with audits
//!
//! The gate is the ledger-level tier of the locking scheme. A single mutex
//! guards the in-flight counter, the auditing and closed flags and the
//! transaction counter; one condition variable is broadcast on every change a
//! waiter could care about (drain complete, audit finished, ledger closed).
//!
//! Account locks are never taken while the gate mutex is held, and the gate
//! mutex is never taken while an account lock is held.
//!
//! # Protocol
//!
//! ```text
//! transfer:  enter_transfer ── withdraw/deposit ── exit_transfer ─┐
//!                                                                 │ every Kth
//! audit:     begin_audit (claim, drain) ── read balances ── drop permit (resume)
//! ```

use crate::types::LedgerError;
use parking_lot::{Condvar, Mutex};

/// State shared by every transfer and audit
#[derive(Debug, Default)]
struct GateState {
    /// Transfers admitted but not yet finished
    in_flight: usize,

    /// True while an audit holds exclusive access
    auditing: bool,

    /// Terminal once set
    closed: bool,

    /// Completed transfers (successful or not)
    transactions: u64,
}

/// Mutex plus condition variable implementing the transfer/audit exclusion
#[derive(Debug)]
pub(crate) struct QuiescenceGate {
    state: Mutex<GateState>,
    changed: Condvar,
    audit_period: u64,
}

impl QuiescenceGate {
    /// Create an open gate that requests an audit every `audit_period` transfers
    ///
    /// `audit_period` must be non-zero; the ledger config validates it.
    pub(crate) fn new(audit_period: u64) -> Self {
        QuiescenceGate {
            state: Mutex::new(GateState::default()),
            changed: Condvar::new(),
            audit_period,
        }
    }

    /// Admit a transfer
    ///
    /// Blocks while an audit is active. Fails with `Closed` if the ledger is
    /// closed on entry or closes while waiting.
    pub(crate) fn enter_transfer(&self) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        self.changed.wait_while(&mut state, |s| s.auditing && !s.closed);
        if state.closed {
            return Err(LedgerError::Closed);
        }
        state.in_flight += 1;
        Ok(())
    }

    /// Retire a transfer admitted by [`QuiescenceGate::enter_transfer`]
    ///
    /// # Returns
    ///
    /// `true` if the transaction count just reached a multiple of the audit
    /// period, meaning this caller is responsible for running an audit.
    pub(crate) fn exit_transfer(&self) -> bool {
        let mut state = self.state.lock();
        state.in_flight -= 1;
        state.transactions += 1;
        if state.in_flight == 0 && state.auditing {
            self.changed.notify_all();
        }
        state.transactions % self.audit_period == 0
    }

    /// Claim exclusive access for an audit and drain in-flight transfers
    ///
    /// Waits for any audit already running to finish, then raises the
    /// auditing flag (which stops new admissions) and waits for the in-flight
    /// count to reach zero. The returned permit releases the gate when dropped.
    pub(crate) fn begin_audit(&self) -> Result<AuditPermit<'_>, LedgerError> {
        let mut state = self.state.lock();
        self.changed.wait_while(&mut state, |s| s.auditing && !s.closed);
        if state.closed {
            return Err(LedgerError::Closed);
        }
        state.auditing = true;

        self.changed.wait_while(&mut state, |s| s.in_flight > 0 && !s.closed);
        if state.closed {
            state.auditing = false;
            self.changed.notify_all();
            return Err(LedgerError::Closed);
        }

        Ok(AuditPermit {
            gate: self,
            transaction_count: state.transactions,
            violated: false,
        })
    }

    /// Release exclusive access, closing the gate if the audit failed
    fn end_audit(&self, violated: bool) {
        let mut state = self.state.lock();
        state.auditing = false;
        if violated {
            state.closed = true;
        }
        self.changed.notify_all();
    }

    /// Close the gate and wake every waiter
    ///
    /// # Returns
    ///
    /// `true` if this call performed the close, `false` if already closed.
    pub(crate) fn close(&self) -> bool {
        let mut state = self.state.lock();
        if state.closed {
            return false;
        }
        state.closed = true;
        self.changed.notify_all();
        true
    }

    pub(crate) fn is_open(&self) -> bool {
        !self.state.lock().closed
    }

    pub(crate) fn transactions(&self) -> u64 {
        self.state.lock().transactions
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.state.lock().in_flight
    }

    #[cfg(test)]
    pub(crate) fn is_auditing(&self) -> bool {
        self.state.lock().auditing
    }
}

/// Exclusive right to read balances, held for the duration of one audit
///
/// Dropping the permit resumes transfers (or closes the ledger if the audit
/// was marked violated), so an observer panic cannot leave the gate stuck.
#[derive(Debug)]
pub(crate) struct AuditPermit<'a> {
    gate: &'a QuiescenceGate,
    transaction_count: u64,
    violated: bool,
}

impl AuditPermit<'_> {
    /// Transaction count at the moment the gate drained
    pub(crate) fn transaction_count(&self) -> u64 {
        self.transaction_count
    }

    /// Close the ledger instead of resuming when this permit is released
    pub(crate) fn mark_violated(&mut self) {
        self.violated = true;
    }
}

impl Drop for AuditPermit<'_> {
    fn drop(&mut self) {
        self.gate.end_audit(self.violated);
    }
}
