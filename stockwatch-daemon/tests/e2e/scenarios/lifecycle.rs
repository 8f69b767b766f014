//! Manual lifecycle driving: submit, consume, shutdown.

use std::sync::Arc;
use std::time::Duration;

use stockwatch_core::error::PoolError;
use stockwatch_core::record::SensorId;
use stockwatch_daemon::orchestrator::{Orchestrator, OrchestratorState};
use stockwatch_daemon::scan_task::ScanState;

use crate::helpers::config::fleet;
use crate::helpers::scanners::ScriptedScanner;

/// Handles come back immediately and in the pending state.
#[tokio::test(start_paused = true)]
async fn test_e2e_submit_returns_immediately() {
    let scanner = ScriptedScanner::new()
        .sensor(1, &["A"])
        .sensor(2, &["B"])
        .delay(Duration::from_secs(10));

    let mut orchestrator = Orchestrator::builder()
        .scanner(Arc::new(scanner))
        .fleet(fleet([], 1))
        .build()
        .unwrap();
    orchestrator.start();
    assert_eq!(orchestrator.state(), OrchestratorState::Submitting);

    let first = orchestrator.submit(SensorId::new(1)).unwrap();
    let second = orchestrator.submit(SensorId::new(2)).unwrap();
    assert_eq!(second.state(), ScanState::Pending);

    tokio::time::sleep(Duration::from_millis(1)).await;
    // Capacity one: the second scan waits behind the first.
    assert_eq!(first.state(), ScanState::Running);
    assert_eq!(second.state(), ScanState::Pending);

    orchestrator.consume_all([first, second]);
    let report = orchestrator.shutdown().await;
    assert_eq!(report.final_summary.total, 2);
    assert_eq!(orchestrator.state(), OrchestratorState::Terminated);
}

/// Submissions are refused once shutdown has closed the pool.
#[tokio::test(start_paused = true)]
async fn test_e2e_submit_after_shutdown_rejected() {
    let mut orchestrator = Orchestrator::builder()
        .scanner(Arc::new(ScriptedScanner::new()))
        .fleet(fleet([], 2))
        .build()
        .unwrap();
    orchestrator.start();
    orchestrator.shutdown().await;

    assert_eq!(
        orchestrator.submit(SensorId::new(1)).unwrap_err(),
        PoolError::Closed
    );
}

/// Queued scans submitted before shutdown still run during the drain.
#[tokio::test(start_paused = true)]
async fn test_e2e_queued_scans_drain_after_close() {
    let scanner = ScriptedScanner::new()
        .sensor(1, &["A"])
        .sensor(2, &["B"])
        .sensor(3, &["C"])
        .delay(Duration::from_secs(2));
    let aggregator_total = {
        let mut orchestrator = Orchestrator::builder()
            .scanner(Arc::new(scanner))
            .fleet(fleet([], 1))
            .build()
            .unwrap();
        orchestrator.start();
        let handles: Vec<_> = (1..=3)
            .map(|id| orchestrator.submit(SensorId::new(id)).unwrap())
            .collect();
        orchestrator.consume_all(handles);
        orchestrator.shutdown().await.final_summary.total
    };
    assert_eq!(aggregator_total, 3);
}
