//! A failing scan affects only its own contribution.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use stockwatch_core::record::SensorId;
use stockwatch_daemon::orchestrator::{Orchestrator, PhaseOutcome};

use crate::helpers::config::fleet;
use crate::helpers::scanners::ScriptedScanner;

/// One failing sensor contributes nothing; the rest still aggregate.
#[tokio::test(start_paused = true)]
async fn test_e2e_failing_scan_contributes_nothing() {
    let scanner = ScriptedScanner::new()
        .sensor(1, &["A", "B"])
        .sensor(2, &["SHOULD-NOT-APPEAR"])
        .failing(2)
        .sensor(3, &["C"]);

    let report = Orchestrator::builder()
        .scanner(Arc::new(scanner))
        .fleet(fleet(1..=3, 3))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.scans_succeeded, 2);
    assert_eq!(report.scans_failed, 1);
    assert_eq!(report.failed_sensors, vec![SensorId::new(2)]);
    assert_eq!(report.final_summary.total, 3);
    assert_eq!(report.scan_phase, PhaseOutcome::Drained);
}

/// Every sensor failing still produces a clean shutdown and a zero summary.
#[tokio::test(start_paused = true)]
async fn test_e2e_all_scans_fail() {
    let scanner = ScriptedScanner::new().failing(1).failing(2).failing(3);
    let started = scanner.started();

    let report = Orchestrator::builder()
        .scanner(Arc::new(scanner))
        .fleet(fleet(1..=3, 2))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(started.load(Ordering::SeqCst), 3);
    assert_eq!(report.scans_failed, 3);
    assert_eq!(report.final_summary.total, 0);
    assert!(report.scan_phase.is_clean());
}
