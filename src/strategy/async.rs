//! Tokio-backed driver strategy
//!
//! Drivers run on a dedicated multi-threaded tokio runtime. The ledger blocks
//! on condition variables, so every driver body goes to the blocking pool via
//! `spawn_blocking`; the async side only awaits their completion. The
//! blocking pool is sized to the driver count so every driver can pass the
//! start barrier together.
//!
//! ```text
//! AsyncDriverStrategy
//!     ├── DriverConfig (drivers, transfers, worker_threads)
//!     ├── tokio runtime (worker_threads, blocking pool >= drivers)
//!     └── spawn_blocking × drivers ── join_all
//! ```

use crate::core::Ledger;
use crate::strategy::{build_drivers, summarize, DriverConfig, DriverStrategy, RunSummary};
use crate::types::LedgerError;
use futures::future::join_all;
use std::sync::{Arc, Barrier};
use tracing::info;

/// Drivers on a tokio runtime's blocking pool
#[derive(Debug, Clone)]
pub struct AsyncDriverStrategy {
    config: DriverConfig,
}

impl AsyncDriverStrategy {
    /// Create a new AsyncDriverStrategy with the specified configuration
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }
}

impl DriverStrategy for AsyncDriverStrategy {
    fn run(&self, ledger: Arc<Ledger>) -> Result<RunSummary, LedgerError> {
        let drivers = build_drivers(&self.config, ledger.num_accounts());

        // Drivers park on the start barrier, so each needs its own pool thread.
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.worker_threads.max(1))
            .max_blocking_threads(drivers.len().max(1))
            .thread_name("ledger-driver")
            .build()?;
        let start = Arc::new(Barrier::new(drivers.len()));
        info!(
            drivers = drivers.len(),
            worker_threads = self.config.worker_threads,
            "starting driver tasks"
        );

        let results = runtime.block_on(async {
            let tasks = drivers.into_iter().map(|driver| {
                let ledger = Arc::clone(&ledger);
                let start = Arc::clone(&start);
                tokio::task::spawn_blocking(move || {
                    start.wait();
                    driver.run(ledger.as_ref(), &mut rand::thread_rng())
                })
            });
            join_all(tasks).await
        });

        summarize(&ledger, results)
    }
}
