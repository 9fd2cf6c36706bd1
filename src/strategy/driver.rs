//! Transfer driver
//!
//! A driver repeatedly withdraws from its own account into a randomly chosen
//! one until its workload is exhausted or the ledger closes, then closes the
//! ledger itself. It only talks to the ledger through [`TransferLedger`].

use crate::core::TransferLedger;
use crate::types::{AccountId, Balance, LedgerError};
use rand::Rng;
use tracing::{debug, warn};

/// Why a driver stopped issuing transfers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every planned transfer was issued
    WorkloadExhausted,
    /// The ledger was closed (by another driver or an audit)
    LedgerClosed,
}

/// Result of one driver's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverOutcome {
    /// Driver index
    pub driver: usize,
    /// Account the driver withdraws from
    pub from: AccountId,
    /// Transfers accepted by the ledger
    pub completed: usize,
    /// Why the driver stopped
    pub stopped_by: StopReason,
}

/// Workload generator bound to one originating account
#[derive(Debug, Clone)]
pub struct TransferDriver {
    id: usize,
    from: AccountId,
    transfers: usize,
    max_amount: Balance,
}

impl TransferDriver {
    /// Create a driver
    ///
    /// # Arguments
    ///
    /// * `id` - Driver index (for reporting)
    /// * `from` - Account every transfer withdraws from
    /// * `transfers` - Maximum number of transfers to issue
    /// * `max_amount` - Amounts are drawn uniformly from `0..max_amount`
    pub fn new(id: usize, from: AccountId, transfers: usize, max_amount: Balance) -> Self {
        Self {
            id,
            from,
            transfers,
            max_amount,
        }
    }

    /// Account every transfer withdraws from
    pub fn source_account(&self) -> AccountId {
        self.from
    }

    /// Drive the ledger, then close it
    ///
    /// The ledger is closed exactly once by this call however the loop ends.
    ///
    /// # Returns
    ///
    /// * `Ok(DriverOutcome)` - The workload ran out or the ledger closed
    /// * `Err(LedgerError)` - The ledger reported a fatal error; the driver
    ///   stopped immediately. Non-fatal rejections are logged and skipped.
    pub fn run<L, R>(&self, ledger: &L, rng: &mut R) -> Result<DriverOutcome, LedgerError>
    where
        L: TransferLedger + ?Sized,
        R: Rng,
    {
        let result = self.drive(ledger, rng);
        ledger.close();

        match &result {
            Ok(outcome) => debug!(
                driver = self.id,
                from = self.from,
                completed = outcome.completed,
                stopped_by = ?outcome.stopped_by,
                "driver finished"
            ),
            Err(e) => warn!(driver = self.id, from = self.from, error = %e, "driver aborted"),
        }

        result
    }

    fn drive<L, R>(&self, ledger: &L, rng: &mut R) -> Result<DriverOutcome, LedgerError>
    where
        L: TransferLedger + ?Sized,
        R: Rng,
    {
        let num_accounts = ledger.num_accounts();
        if num_accounts == 0 {
            return Ok(self.outcome(0, StopReason::WorkloadExhausted));
        }
        let mut completed = 0;

        for _ in 0..self.transfers {
            if !ledger.is_open() {
                return Ok(self.outcome(completed, StopReason::LedgerClosed));
            }

            let to = rng.gen_range(0..num_accounts);
            let amount = rng.gen_range(0..=self.max_amount.saturating_sub(1));

            match ledger.transfer(self.from, to, amount) {
                Ok(()) => completed += 1,
                Err(LedgerError::Closed) => {
                    return Ok(self.outcome(completed, StopReason::LedgerClosed))
                }
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => warn!(driver = self.id, to, error = %e, "transfer rejected"),
            }
        }

        Ok(self.outcome(completed, StopReason::WorkloadExhausted))
    }

    fn outcome(&self, completed: usize, stopped_by: StopReason) -> DriverOutcome {
        DriverOutcome {
            driver: self.id,
            from: self.from,
            completed,
            stopped_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    /// Ledger double that records calls and fails on demand
    struct MockLedger {
        accounts: usize,
        open: AtomicBool,
        transfers: AtomicU64,
        closes: AtomicUsize,
        close_after: Option<u64>,
        fail_with: Option<LedgerError>,
        max_seen_amount: AtomicU64,
    }

    impl MockLedger {
        fn new(accounts: usize) -> Self {
            Self {
                accounts,
                open: AtomicBool::new(true),
                transfers: AtomicU64::new(0),
                closes: AtomicUsize::new(0),
                close_after: None,
                fail_with: None,
                max_seen_amount: AtomicU64::new(0),
            }
        }
    }

    impl TransferLedger for MockLedger {
        fn num_accounts(&self) -> usize {
            self.accounts
        }

        fn transfer(
            &self,
            _from: AccountId,
            to: AccountId,
            amount: Balance,
        ) -> Result<(), LedgerError> {
            assert!(to < self.accounts);
            if !self.open.load(Ordering::SeqCst) {
                return Err(LedgerError::Closed);
            }
            if let Some(error) = &self.fail_with {
                return Err(error.clone());
            }
            self.max_seen_amount.fetch_max(amount, Ordering::SeqCst);
            let count = self.transfers.fetch_add(1, Ordering::SeqCst) + 1;
            if Some(count) == self.close_after {
                self.open.store(false, Ordering::SeqCst);
            }
            Ok(())
        }

        fn is_open(&self) -> bool {
            self.open.load(Ordering::SeqCst)
        }

        fn close(&self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
            self.open.store(false, Ordering::SeqCst);
        }

        fn num_transactions(&self) -> u64 {
            self.transfers.load(Ordering::SeqCst)
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn test_driver_exhausts_workload_then_closes() {
        let ledger = MockLedger::new(4);
        let driver = TransferDriver::new(0, 2, 50, 100);

        let outcome = driver.run(&ledger, &mut rng()).unwrap();

        assert_eq!(outcome.completed, 50);
        assert_eq!(outcome.from, 2);
        assert_eq!(outcome.stopped_by, StopReason::WorkloadExhausted);
        assert_eq!(ledger.num_transactions(), 50);
        assert_eq!(ledger.closes.load(Ordering::SeqCst), 1);
        assert!(ledger.max_seen_amount.load(Ordering::SeqCst) < 100);
    }

    #[test]
    fn test_driver_stops_when_ledger_closes() {
        let mut ledger = MockLedger::new(4);
        ledger.close_after = Some(5);
        let driver = TransferDriver::new(1, 0, 1_000, 10);

        let outcome = driver.run(&ledger, &mut rng()).unwrap();

        assert_eq!(outcome.completed, 5);
        assert_eq!(outcome.stopped_by, StopReason::LedgerClosed);
        assert_eq!(ledger.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_driver_on_closed_ledger_issues_nothing() {
        let ledger = MockLedger::new(4);
        ledger.open.store(false, Ordering::SeqCst);
        let driver = TransferDriver::new(0, 0, 10, 10);

        let outcome = driver.run(&ledger, &mut rng()).unwrap();

        assert_eq!(outcome.completed, 0);
        assert_eq!(outcome.stopped_by, StopReason::LedgerClosed);
        assert_eq!(ledger.num_transactions(), 0);
    }

    #[test]
    fn test_driver_stops_on_integrity_violation() {
        let mut ledger = MockLedger::new(4);
        ledger.fail_with = Some(LedgerError::integrity_violation(400, 399));
        let driver = TransferDriver::new(0, 0, 10, 10);

        let result = driver.run(&ledger, &mut rng());

        assert_eq!(result, Err(LedgerError::integrity_violation(400, 399)));
        assert_eq!(ledger.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_driver_skips_non_fatal_rejections() {
        let mut ledger = MockLedger::new(4);
        ledger.fail_with = Some(LedgerError::unknown_account(9, 4));
        let driver = TransferDriver::new(0, 0, 10, 10);

        let outcome = driver.run(&ledger, &mut rng()).unwrap();

        assert_eq!(outcome.completed, 0);
        assert_eq!(outcome.stopped_by, StopReason::WorkloadExhausted);
        assert_eq!(ledger.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_driver_on_empty_ledger_issues_nothing() {
        let ledger = MockLedger::new(0);
        let driver = TransferDriver::new(0, 0, 10, 10);

        let outcome = driver.run(&ledger, &mut rng()).unwrap();

        assert_eq!(outcome.completed, 0);
        assert_eq!(outcome.stopped_by, StopReason::WorkloadExhausted);
        assert_eq!(ledger.num_transactions(), 0);
        assert_eq!(ledger.closes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_zero_max_amount_transfers_nothing() {
        let ledger = MockLedger::new(2);
        let driver = TransferDriver::new(0, 0, 20, 0);

        let outcome = driver.run(&ledger, &mut rng()).unwrap();

        assert_eq!(outcome.completed, 20);
        assert_eq!(ledger.max_seen_amount.load(Ordering::SeqCst), 0);
    }
}
