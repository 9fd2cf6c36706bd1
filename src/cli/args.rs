use crate::core::LedgerConfig;
use crate::strategy::DriverConfig;
use crate::types::Balance;
use clap::{Parser, ValueEnum};

/// Concurrent ledger simulation with periodic integrity audits
#[derive(Parser, Debug)]
#[command(name = "ledger-sim")]
#[command(about = "Run concurrent transfers against a ledger and audit its total", long_about = None)]
pub struct CliArgs {
    /// Number of accounts in the ledger
    #[arg(long = "accounts", value_name = "COUNT", default_value_t = 10)]
    pub accounts: usize,

    /// Balance every account starts with
    #[arg(long = "initial-balance", value_name = "AMOUNT", default_value_t = 10_000)]
    pub initial_balance: Balance,

    /// Audit after every this many transactions
    #[arg(long = "audit-period", value_name = "K", default_value_t = crate::core::DEFAULT_AUDIT_PERIOD)]
    pub audit_period: u64,

    /// Driver execution strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Driver strategy: 'sync' for one thread per driver or 'async' for a tokio runtime"
    )]
    pub strategy: StrategyType,

    /// Number of concurrent drivers
    #[arg(
        long = "drivers",
        value_name = "COUNT",
        help = "Number of concurrent drivers (default: one per account)"
    )]
    pub drivers: Option<usize>,

    /// Transfers issued by each driver
    #[arg(
        long = "transfers",
        value_name = "COUNT",
        help = "Transfers issued by each driver (default: 10000)"
    )]
    pub transfers: Option<usize>,

    /// Exclusive upper bound on transfer amounts
    #[arg(
        long = "max-amount",
        value_name = "AMOUNT",
        help = "Exclusive upper bound on transfer amounts (default: initial balance)"
    )]
    pub max_amount: Option<Balance>,

    /// Worker threads for the async strategy
    #[arg(
        long = "worker-threads",
        value_name = "COUNT",
        help = "Runtime worker threads, async strategy only (default: CPU cores)"
    )]
    pub worker_threads: Option<usize>,
}

/// Available driver strategies
#[derive(Clone, Debug, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Ledger configuration from CLI arguments
    ///
    /// Not validated here; the ledger rejects invalid sizes at construction.
    pub fn to_ledger_config(&self) -> LedgerConfig {
        LedgerConfig::new(self.accounts, self.initial_balance).with_audit_period(self.audit_period)
    }

    /// Driver configuration from CLI arguments
    ///
    /// Defaults are derived from the ledger configuration; zero overrides
    /// fall back to those defaults with a warning.
    pub fn to_driver_config(&self) -> DriverConfig {
        DriverConfig::for_ledger(&self.to_ledger_config()).with_overrides(
            self.drivers,
            self.transfers,
            self.max_amount,
            self.worker_threads,
        )
    }
}
