//! Thread-per-driver strategy
//!
//! Each driver runs on its own OS thread (scoped, so the ledger is borrowed
//! rather than cloned into every thread). Blocking inside the ledger parks
//! only the thread that blocked.

use crate::core::Ledger;
use crate::strategy::{build_drivers, summarize, DriverConfig, DriverStrategy, RunSummary};
use crate::types::LedgerError;
use std::sync::{Arc, Barrier};
use std::thread;
use tracing::info;

/// One OS thread per driver
#[derive(Debug, Clone)]
pub struct SyncDriverStrategy {
    config: DriverConfig,
}

impl SyncDriverStrategy {
    /// Create a new SyncDriverStrategy with the specified configuration
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }
}

impl DriverStrategy for SyncDriverStrategy {
    fn run(&self, ledger: Arc<Ledger>) -> Result<RunSummary, LedgerError> {
        let drivers = build_drivers(&self.config, ledger.num_accounts());
        info!(drivers = drivers.len(), "starting driver threads");
        let start = Barrier::new(drivers.len());

        let results = thread::scope(|scope| {
            let handles: Vec<_> = drivers
                .iter()
                .map(|driver| {
                    let ledger = ledger.as_ref();
                    let start = &start;
                    scope.spawn(move || {
                        start.wait();
                        driver.run(ledger, &mut rand::thread_rng())
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| handle.join())
                .collect::<Vec<_>>()
        });

        summarize(&ledger, results)
    }
}
