//! Benchmark suite comparing driver strategies
//!
//! Measures a full run (ledger construction, drivers, audits, close) using
//! the divan benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! Each benchmark uses 4 accounts and 8 drivers; the audit period is varied
//! to show what the drain-and-check protocol costs.

use ledger_sim::cli::StrategyType;
use ledger_sim::strategy::{create_strategy, DriverConfig};
use ledger_sim::{Ledger, LedgerConfig};
use std::sync::Arc;

fn main() {
    divan::main();
}

fn run(strategy_type: StrategyType, audit_period: u64) {
    let ledger_config = LedgerConfig::new(4, 100).with_audit_period(audit_period);
    let ledger = Arc::new(Ledger::with_config(ledger_config.clone()).expect("valid config"));
    let driver_config =
        DriverConfig::for_ledger(&ledger_config).with_overrides(Some(8), Some(2_000), None, None);

    create_strategy(strategy_type, driver_config)
        .run(ledger)
        .expect("Run failed");
}

/// Thread-per-driver strategy, audit every 10 transfers
#[divan::bench]
fn sync_strategy_frequent_audits() {
    run(StrategyType::Sync, 10);
}

/// Tokio strategy, audit every 10 transfers
#[divan::bench]
fn async_strategy_frequent_audits() {
    run(StrategyType::Async, 10);
}

/// Thread-per-driver strategy, audit every 1,000 transfers
#[divan::bench]
fn sync_strategy_rare_audits() {
    run(StrategyType::Sync, 1_000);
}

/// Tokio strategy, audit every 1,000 transfers
#[divan::bench]
fn async_strategy_rare_audits() {
    run(StrategyType::Async, 1_000);
}
