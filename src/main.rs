//! Concurrent Ledger Simulator CLI
//!
//! Runs transfer drivers against a shared ledger and prints every audit.
//!
//! # Usage
//!
//! ```bash
//! cargo run
//! cargo run -- --accounts 4 --initial-balance 100 --drivers 8
//! cargo run -- --strategy async --worker-threads 4
//! RUST_LOG=debug cargo run -- --audit-period 100
//! ```
//!
//! Audit reports go to stdout; logs go to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success, every audit balanced
//! - 1: Error (invalid configuration, runtime failure)
//! - 2: Integrity violation

use ledger_sim::cli;
use ledger_sim::io::AuditPrinter;
use ledger_sim::strategy;
use ledger_sim::{Ledger, LedgerError};
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = cli::parse_args();

    let ledger = match Ledger::with_config(args.to_ledger_config()) {
        Ok(ledger) => Arc::new(ledger.with_observer(AuditPrinter::stdout())),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    let strategy = strategy::create_strategy(args.strategy.clone(), args.to_driver_config());

    match strategy.run(Arc::clone(&ledger)) {
        Ok(summary) => {
            info!(
                transactions = summary.transactions,
                audits = summary.audits,
                drivers = summary.outcomes.len(),
                "simulation finished"
            );
        }
        Err(e @ LedgerError::IntegrityViolation { .. }) => {
            error!("{}", e);
            process::exit(2);
        }
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
