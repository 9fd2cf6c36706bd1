//! End-to-end scenario tests
//!
//! These tests run full driver workloads against a real ledger with both
//! driver strategies and check that:
//! 1. Every audit taken during the run found the expected total
//! 2. No audit ever read balances with a transfer in flight
//! 3. The run terminates (no deadlock) within a bounded time
//! 4. The ledger ends closed and rejects further work
//! 5. Drivers actually overlap rather than running one after another

#[cfg(test)]
mod tests {
    use ledger_sim::cli::StrategyType;
    use ledger_sim::strategy::{create_strategy, DriverConfig, RunSummary};
    use ledger_sim::{AuditReport, Ledger, LedgerConfig, LedgerError};
    use parking_lot::Mutex;
    use rstest::rstest;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const DEADLOCK_TIMEOUT: Duration = Duration::from_secs(120);

    /// Run a workload on a helper thread and fail if it does not finish in time
    ///
    /// Returns the run summary, the ledger, and every audit report observed.
    fn run_with_timeout(
        ledger_config: LedgerConfig,
        strategy_type: StrategyType,
        drivers: usize,
        transfers: usize,
    ) -> (
        Result<RunSummary, LedgerError>,
        Arc<Ledger>,
        Vec<AuditReport>,
    ) {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let ledger = {
            let reports = Arc::clone(&reports);
            Arc::new(
                Ledger::with_config(ledger_config.clone())
                    .expect("valid ledger config")
                    .with_observer(move |report: &AuditReport| reports.lock().push(report.clone())),
            )
        };
        let driver_config = DriverConfig::for_ledger(&ledger_config).with_overrides(
            Some(drivers),
            Some(transfers),
            None,
            Some(2),
        );

        let (tx, rx) = mpsc::channel();
        {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || {
                let strategy = create_strategy(strategy_type, driver_config);
                let _ = tx.send(strategy.run(ledger));
            });
        }

        let result = rx
            .recv_timeout(DEADLOCK_TIMEOUT)
            .unwrap_or_else(|_| panic!("driver run did not finish within {:?}", DEADLOCK_TIMEOUT));

        let reports = reports.lock().clone();
        (result, ledger, reports)
    }

    /// Four accounts of 100, eight drivers of 10,000 transfers, audit every 10
    #[rstest]
    fn test_audited_scenario(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let config = LedgerConfig::new(4, 100).with_audit_period(10);

        let (result, ledger, reports) = run_with_timeout(config, strategy, 8, 10_000);
        let summary = result.expect("no integrity violation");

        assert!(!reports.is_empty());
        for report in &reports {
            assert_eq!(report.total, 400, "audit {} drifted", report.sequence);
            assert_eq!(report.in_flight, 0);
            assert_eq!(report.balances.len(), 4);
        }
        assert_eq!(summary.audits, reports.len() as u64);
        assert_eq!(summary.outcomes.len(), 8);

        // Drivers start together, so audits ran against overlapping transfers
        let active = summary.outcomes.iter().filter(|o| o.completed > 0).count();
        assert!(active > 1, "only {} driver(s) issued transfers", active);

        assert!(!ledger.is_open());
        assert_eq!(ledger.transfer(0, 1, 1), Err(LedgerError::Closed));
        let total: u64 = (0..4).map(|id| ledger.balance(id).unwrap()).sum();
        assert_eq!(total, 400);
    }

    #[rstest]
    fn test_audit_sequence_is_serialized(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        let config = LedgerConfig::new(3, 50).with_audit_period(1);

        let (result, _ledger, reports) = run_with_timeout(config, strategy, 6, 500);
        result.expect("no integrity violation");

        // Observers run inside the exclusive section, so reports arrive in order
        let sequences: Vec<u64> = reports.iter().map(|r| r.sequence).collect();
        let expected: Vec<u64> = (1..=reports.len() as u64).collect();
        assert_eq!(sequences, expected);

        let counts: Vec<u64> = reports.iter().map(|r| r.transaction_count).collect();
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[rstest]
    fn test_single_account_self_transfers(
        #[values(StrategyType::Sync, StrategyType::Async)] strategy: StrategyType,
    ) {
        // Every transfer is from == to
        let config = LedgerConfig::new(1, 1_000).with_audit_period(7);

        let (result, ledger, reports) = run_with_timeout(config, strategy, 4, 2_000);
        result.expect("no integrity violation");

        assert!(reports.iter().all(AuditReport::is_balanced));
        assert_eq!(ledger.balance(0), Ok(1_000));
    }
}
