//! Ledger: account ownership, transfers and the audit protocol
//!
//! The ledger owns a fixed vector of [`Account`]s and a [`QuiescenceGate`].
//! Transfers run concurrently with each other; every `audit_period`
//! completed transfers, the transfer that crossed the boundary runs an audit
//! synchronously before returning to its caller.
//!
//! # Audit protocol
//!
//! 1. Claim the gate (waits for any running audit), blocking new transfers
//! 2. Wait for in-flight transfers to drain
//! 3. Read every balance exactly once and sum them
//! 4. Balanced: resume transfers. Unbalanced: close the ledger and return
//!    [`LedgerError::IntegrityViolation`] to the caller
//!
//! Because no transfer is between its withdraw and deposit legs while the
//! balances are read, an audit never observes money in transit.

use crate::core::gate::QuiescenceGate;
use crate::core::traits::{AuditObserver, TransferLedger};
use crate::types::error::checked_total;
use crate::types::{Account, AccountId, AuditReport, Balance, LedgerError};
use parking_lot::Mutex;
use tracing::{debug, error, info};

/// Audit every this many transactions unless configured otherwise
pub const DEFAULT_AUDIT_PERIOD: u64 = 10;

/// Ledger construction parameters
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Number of accounts
    pub num_accounts: usize,
    /// Balance every account starts with
    pub initial_balance: Balance,
    /// Run an audit each time the transaction count reaches a multiple of this
    pub audit_period: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            num_accounts: 10,
            initial_balance: 10_000,
            audit_period: DEFAULT_AUDIT_PERIOD,
        }
    }
}

impl LedgerConfig {
    /// Create a LedgerConfig with the default audit period
    pub fn new(num_accounts: usize, initial_balance: Balance) -> Self {
        Self {
            num_accounts,
            initial_balance,
            audit_period: DEFAULT_AUDIT_PERIOD,
        }
    }

    /// Override the audit period
    pub fn with_audit_period(mut self, audit_period: u64) -> Self {
        self.audit_period = audit_period;
        self
    }

    /// Check the configuration and compute the expected total
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if:
    /// - There are no accounts
    /// - The audit period is zero
    /// - `num_accounts * initial_balance` does not fit in a `Balance`
    pub fn validate(&self) -> Result<Balance, LedgerError> {
        if self.num_accounts == 0 {
            return Err(LedgerError::invalid_config("ledger needs at least one account"));
        }
        if self.audit_period == 0 {
            return Err(LedgerError::invalid_config("audit period must be non-zero"));
        }
        checked_total(self.num_accounts, self.initial_balance).ok_or_else(|| {
            LedgerError::invalid_config(format!(
                "{} accounts of {} overflow the total balance",
                self.num_accounts, self.initial_balance
            ))
        })
    }
}

/// Audit bookkeeping, only written while an audit holds the gate
#[derive(Debug, Default)]
struct AuditHistory {
    performed: u64,
    last: Option<AuditReport>,
}

/// Concurrent ledger of fixed accounts with periodic integrity audits
pub struct Ledger {
    /// Accounts, indexed by ID
    accounts: Vec<Account>,

    /// `num_accounts * initial_balance`, fixed at construction
    expected_total: Balance,

    /// Transfer/audit exclusion and lifecycle
    gate: QuiescenceGate,

    history: Mutex<AuditHistory>,

    observers: Vec<Box<dyn AuditObserver>>,
}

impl Ledger {
    /// Create a ledger of `num_accounts` accounts holding `initial_balance` each
    ///
    /// Uses [`DEFAULT_AUDIT_PERIOD`].
    ///
    /// # Errors
    ///
    /// See [`LedgerConfig::validate`].
    pub fn new(num_accounts: usize, initial_balance: Balance) -> Result<Self, LedgerError> {
        Self::with_config(LedgerConfig::new(num_accounts, initial_balance))
    }

    /// Create a ledger from a full configuration
    pub fn with_config(config: LedgerConfig) -> Result<Self, LedgerError> {
        let expected_total = config.validate()?;

        let accounts = (0..config.num_accounts)
            .map(|id| Account::new(id, config.initial_balance))
            .collect();

        info!(
            num_accounts = config.num_accounts,
            initial_balance = config.initial_balance,
            audit_period = config.audit_period,
            "ledger opened"
        );

        Ok(Ledger {
            accounts,
            expected_total,
            gate: QuiescenceGate::new(config.audit_period),
            history: Mutex::new(AuditHistory::default()),
            observers: Vec::new(),
        })
    }

    /// Register an observer that sees every audit report
    pub fn with_observer(mut self, observer: impl AuditObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Move `amount` from account `from` to account `to`
    ///
    /// Money moves only if the withdrawal succeeds; insufficient funds leaves
    /// both balances untouched and still counts as a completed transaction.
    /// `from == to` is allowed and nets to no change.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transfer completed (whether or not funds moved)
    /// * `Err(LedgerError::Closed)` - The ledger was closed; nothing changed
    /// * `Err(LedgerError::UnknownAccount)` - Bad account ID; nothing changed
    /// * `Err(LedgerError::IntegrityViolation)` - This transfer triggered an
    ///   audit that failed; the ledger is now closed
    pub fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        let source = self.account(from)?;
        let target = self.account(to)?;

        self.gate.enter_transfer()?;
        if source.withdraw(amount) {
            target.deposit(amount);
        }
        let audit_due = self.gate.exit_transfer();

        if audit_due {
            match self.audit() {
                Ok(_) => {}
                // The money already moved; the next call will observe the close.
                Err(LedgerError::Closed) => debug!("audit skipped, ledger closed"),
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Run an exclusive integrity audit
    ///
    /// Blocks until any other audit finishes and every in-flight transfer has
    /// drained, reads all balances, notifies observers, then resumes transfers.
    ///
    /// # Errors
    ///
    /// * `Closed` - The ledger was closed before or while the audit waited
    /// * `IntegrityViolation` - The total drifted; the ledger is closed
    pub fn audit(&self) -> Result<AuditReport, LedgerError> {
        let mut permit = self.gate.begin_audit()?;
        let in_flight = self.gate.in_flight();
        debug!(
            transactions = permit.transaction_count(),
            "audit holds the ledger"
        );

        let balances: Vec<(AccountId, Balance)> = self
            .accounts
            .iter()
            .map(|account| (account.id(), account.balance()))
            .collect();
        let total = balances.iter().map(|&(_, b)| u128::from(b)).sum();

        let report = {
            let mut history = self.history.lock();
            history.performed += 1;
            let report = AuditReport {
                sequence: history.performed,
                transaction_count: permit.transaction_count(),
                balances,
                total,
                expected: u128::from(self.expected_total),
                in_flight,
            };
            history.last = Some(report.clone());
            report
        };

        for observer in &self.observers {
            observer.on_audit(&report);
        }

        if report.is_balanced() {
            info!(
                sequence = report.sequence,
                transactions = report.transaction_count,
                total = %report.total,
                "audit passed"
            );
            Ok(report)
        } else {
            error!(
                sequence = report.sequence,
                expected = %report.expected,
                actual = %report.total,
                "integrity violation, closing ledger"
            );
            permit.mark_violated();
            Err(LedgerError::integrity_violation(report.expected, report.total))
        }
    }

    /// Close the ledger and wake every blocked transfer or audit
    ///
    /// Repeated calls have no further effect.
    pub fn close(&self) {
        if self.gate.close() {
            info!(transactions = self.gate.transactions(), "ledger closed");
        }
    }

    /// Whether the ledger still accepts transfers
    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }

    /// Number of completed transfers
    pub fn num_transactions(&self) -> u64 {
        self.gate.transactions()
    }

    /// Number of accounts
    pub fn num_accounts(&self) -> usize {
        self.accounts.len()
    }

    /// Total that every audit must find
    pub fn expected_total(&self) -> Balance {
        self.expected_total
    }

    /// Transfers currently between admission and completion
    pub fn in_flight(&self) -> usize {
        self.gate.in_flight()
    }

    /// Current balance of one account
    ///
    /// Point-in-time for that account only; use [`Ledger::audit`] for a
    /// consistent view of the whole ledger.
    pub fn balance(&self, id: AccountId) -> Result<Balance, LedgerError> {
        self.account(id).map(Account::balance)
    }

    /// Number of audits that have read balances so far
    pub fn audits_performed(&self) -> u64 {
        self.history.lock().performed
    }

    /// The most recent audit report, if any
    pub fn last_audit(&self) -> Option<AuditReport> {
        self.history.lock().last.clone()
    }

    fn account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts
            .get(id)
            .ok_or_else(|| LedgerError::unknown_account(id, self.accounts.len()))
    }
}

impl TransferLedger for Ledger {
    fn num_accounts(&self) -> usize {
        Ledger::num_accounts(self)
    }

    fn transfer(
        &self,
        from: AccountId,
        to: AccountId,
        amount: Balance,
    ) -> Result<(), LedgerError> {
        Ledger::transfer(self, from, to, amount)
    }

    fn is_open(&self) -> bool {
        Ledger::is_open(self)
    }

    fn close(&self) {
        Ledger::close(self)
    }

    fn num_transactions(&self) -> u64 {
        Ledger::num_transactions(self)
    }
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("accounts", &self.accounts)
            .field("expected_total", &self.expected_total)
            .field("gate", &self.gate)
            .field("observers", &self.observers.len())
            .finish()
    }
}
