//! Driver strategy module
//!
//! This module defines the Strategy pattern for running a set of transfer
//! drivers against one shared ledger. The ledger is indifferent to how its
//! callers are scheduled; strategies differ only in where the driver loops
//! execute:
//!
//! - [`SyncDriverStrategy`] - one OS thread per driver
//! - [`AsyncDriverStrategy`] - a tokio multi-threaded runtime, each driver on
//!   the blocking pool

use crate::cli::StrategyType;
use crate::core::{Ledger, LedgerConfig};
use crate::types::{AuditReport, Balance, LedgerError};
use std::sync::Arc;
use tracing::{error, warn};

pub mod r#async;
pub mod driver;
pub mod sync;

pub use self::r#async::AsyncDriverStrategy;
pub use driver::{DriverOutcome, StopReason, TransferDriver};
pub use sync::SyncDriverStrategy;

/// Transfers each driver issues unless configured otherwise
pub const DEFAULT_TRANSFERS_PER_DRIVER: usize = 10_000;

/// Configuration for a driver run
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Number of concurrent drivers (driver `i` withdraws from account `i mod N`)
    pub drivers: usize,
    /// Transfers issued by each driver before it stops
    pub transfers_per_driver: usize,
    /// Exclusive upper bound on a random transfer amount
    pub max_amount: Balance,
    /// Worker threads for the async runtime
    pub worker_threads: usize,
}

impl DriverConfig {
    /// Defaults for a ledger: one driver per account, amounts up to the
    /// initial balance
    pub fn for_ledger(ledger: &LedgerConfig) -> Self {
        Self {
            drivers: ledger.num_accounts,
            transfers_per_driver: DEFAULT_TRANSFERS_PER_DRIVER,
            max_amount: ledger.initial_balance,
            worker_threads: num_cpus::get(),
        }
    }

    /// Apply user overrides on top of these defaults
    ///
    /// `None` keeps the default. Zero is rejected with a warning and also
    /// keeps the default.
    pub fn with_overrides(
        self,
        drivers: Option<usize>,
        transfers_per_driver: Option<usize>,
        max_amount: Option<Balance>,
        worker_threads: Option<usize>,
    ) -> Self {
        Self {
            drivers: non_zero_or("drivers", drivers, self.drivers),
            transfers_per_driver: non_zero_or(
                "transfers_per_driver",
                transfers_per_driver,
                self.transfers_per_driver,
            ),
            max_amount: non_zero_or("max_amount", max_amount, self.max_amount),
            worker_threads: non_zero_or("worker_threads", worker_threads, self.worker_threads),
        }
    }
}

fn non_zero_or<T>(name: &str, value: Option<T>, default: T) -> T
where
    T: Copy + Default + PartialEq + std::fmt::Display,
{
    match value {
        Some(v) if v == T::default() => {
            warn!("Invalid {} ({}), using default ({})", name, v, default);
            default
        }
        Some(v) => v,
        None => default,
    }
}

/// Aggregate result of a driver run
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// One outcome per driver that finished normally
    pub outcomes: Vec<DriverOutcome>,
    /// Transfers completed by the ledger
    pub transactions: u64,
    /// Audits that read balances
    pub audits: u64,
    /// Final audit report, if any audit ran
    pub last_audit: Option<AuditReport>,
}

/// Driver strategy trait
///
/// A strategy spawns the configured drivers against a shared ledger, waits
/// for all of them to stop, and summarizes the run.
pub trait DriverStrategy: Send + Sync {
    /// Run every driver to completion
    ///
    /// # Errors
    ///
    /// Returns the first fatal error any driver reported (an integrity
    /// violation), or an I/O error if the execution environment could not be
    /// set up. The ledger is closed in every case.
    fn run(&self, ledger: Arc<Ledger>) -> Result<RunSummary, LedgerError>;
}

/// Create a driver strategy based on the specified strategy type
pub fn create_strategy(strategy_type: StrategyType, config: DriverConfig) -> Box<dyn DriverStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncDriverStrategy::new(config)),
        StrategyType::Async => Box::new(AsyncDriverStrategy::new(config)),
    }
}

/// Build the driver set described by `config` for a ledger of `num_accounts`
pub(crate) fn build_drivers(config: &DriverConfig, num_accounts: usize) -> Vec<TransferDriver> {
    (0..config.drivers)
        .map(|i| {
            TransferDriver::new(
                i,
                i % num_accounts,
                config.transfers_per_driver,
                config.max_amount,
            )
        })
        .collect()
}

/// Fold per-driver results into a summary
///
/// Drivers that panicked are logged and left out. The first fatal error wins.
pub(crate) fn summarize<E: std::fmt::Debug>(
    ledger: &Ledger,
    results: Vec<Result<Result<DriverOutcome, LedgerError>, E>>,
) -> Result<RunSummary, LedgerError> {
    // A driver that died without returning never got to close the ledger.
    ledger.close();

    let mut outcomes = Vec::with_capacity(results.len());
    let mut first_error = None;

    for result in results {
        match result {
            Ok(Ok(outcome)) => outcomes.push(outcome),
            Ok(Err(e)) => {
                first_error.get_or_insert(e);
            }
            Err(panic) => error!("Driver panicked: {:?}", panic),
        }
    }

    if let Some(e) = first_error {
        return Err(e);
    }

    Ok(RunSummary {
        outcomes,
        transactions: ledger.num_transactions(),
        audits: ledger.audits_performed(),
        last_audit: ledger.last_audit(),
    })
}
