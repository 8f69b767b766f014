//! Bounded two-phase shutdown.

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use stockwatch_core::record::SensorId;
use stockwatch_daemon::orchestrator::{Orchestrator, OrchestratorState, PhaseOutcome};

use crate::helpers::config::{config_with_bounds, fleet};
use crate::helpers::scanners::ScriptedScanner;

/// A scan that never completes is cancelled after the scan bound and the
/// run still terminates with a final summary of what did complete.
#[tokio::test(start_paused = true)]
async fn test_e2e_stuck_scan_forces_cancel_and_terminates() {
    let scanner = ScriptedScanner::new()
        .sensor(1, &["A"])
        .sensor(2, &["B"])
        .stuck(3);

    let started = tokio::time::Instant::now();
    let report = Orchestrator::builder()
        .config(config_with_bounds(120, 30))
        .scanner(Arc::new(scanner))
        .fleet(fleet(1..=3, 3))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(matches!(report.scan_phase, PhaseOutcome::ForcedCancel { .. }));
    assert_eq!(report.report_phase, PhaseOutcome::Drained);
    assert_eq!(report.final_summary.total, 2);
    assert_eq!(report.scans_succeeded, 2);
    assert_eq!(report.scans_unfinished, 1);

    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(120));
    assert!(elapsed < Duration::from_secs(121));
}

/// Queued work behind stuck scans is dropped, never started.
#[tokio::test(start_paused = true)]
async fn test_e2e_forced_cancel_drops_queued_scans() {
    let scanner = ScriptedScanner::new().stuck(1).sensor(2, &["never"]);
    let started_scans = scanner.started();

    let report = Orchestrator::builder()
        .config(config_with_bounds(5, 5))
        .scanner(Arc::new(scanner))
        .fleet(fleet([1, 2], 1))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(started_scans.load(Ordering::SeqCst), 1);
    assert_eq!(report.scan_phase, PhaseOutcome::ForcedCancel { cancelled: 3 });
    assert_eq!(report.final_summary.total, 0);
}

/// Interrupting the wait skips the remaining bound.
#[tokio::test(start_paused = true)]
async fn test_e2e_interrupt_cuts_scan_wait_short() {
    let scanner = ScriptedScanner::new().stuck(1);
    let mut orchestrator = Orchestrator::builder()
        .config(config_with_bounds(3600, 30))
        .scanner(Arc::new(scanner))
        .fleet(fleet([], 1))
        .build()
        .unwrap();
    orchestrator.start();
    let handle = orchestrator.submit(SensorId::new(1)).unwrap();
    orchestrator.consume_all([handle]);

    let interrupt = orchestrator.interrupt_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        interrupt.cancel();
    });

    let started = tokio::time::Instant::now();
    let report = orchestrator.shutdown().await;

    assert!(matches!(report.scan_phase, PhaseOutcome::Interrupted { .. }));
    assert!(started.elapsed() < Duration::from_secs(11));
    assert_eq!(orchestrator.state(), OrchestratorState::Terminated);
}

/// Fast scans finish well inside the bound with no forced cancel.
#[tokio::test(start_paused = true)]
async fn test_e2e_clean_shutdown_within_bounds() {
    let scanner = ScriptedScanner::new()
        .sensor(1, &["A"])
        .delay(Duration::from_secs(3));

    let started = tokio::time::Instant::now();
    let report = Orchestrator::builder()
        .config(config_with_bounds(120, 30))
        .scanner(Arc::new(scanner))
        .fleet(fleet([1], 1))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.scan_phase, PhaseOutcome::Drained);
    assert_eq!(report.report_phase, PhaseOutcome::Drained);
    assert!(started.elapsed() < Duration::from_secs(4));
}
