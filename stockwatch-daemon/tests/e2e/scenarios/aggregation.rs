//! Records from concurrent scans land in one duplicate-free inventory.

use std::sync::Arc;
use std::time::Duration;

use stockwatch_daemon::orchestrator::{Orchestrator, PhaseOutcome};
use stockwatch_inventory::Aggregator;

use crate::helpers::config::fleet;
use crate::helpers::scanners::ScriptedScanner;

/// Nine sensors with distinct ids on a pool of three: everything is kept.
#[tokio::test(start_paused = true)]
async fn test_e2e_distinct_records_all_counted() {
    let names = ["A", "B", "C", "D", "E", "F", "G", "H", "I"];
    let mut scanner = ScriptedScanner::new().delay(Duration::from_millis(200));
    for (i, name) in names.iter().enumerate() {
        scanner = scanner.sensor(i as u32 + 1, &[*name]);
    }

    let report = Orchestrator::builder()
        .scanner(Arc::new(scanner))
        .fleet(fleet(1..=9, 3))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.submitted, 9);
    assert_eq!(report.scans_succeeded, 9);
    assert_eq!(report.final_summary.total, 9);
    assert!(report.duplicates.is_empty());
    assert_eq!(report.scan_phase, PhaseOutcome::Drained);
    assert_eq!(report.report_phase, PhaseOutcome::Drained);
}

/// The same id reported by two sensors is stored once and flagged once.
#[tokio::test(start_paused = true)]
async fn test_e2e_duplicate_across_sensors_counted_once() {
    let scanner = ScriptedScanner::new()
        .sensor(1, &["X"])
        .sensor(2, &["X"])
        .sensor(3, &["Y"]);

    let aggregator = Arc::new(Aggregator::new());
    let report = Orchestrator::builder()
        .scanner(Arc::new(scanner))
        .fleet(fleet(1..=3, 3))
        .aggregator(Arc::clone(&aggregator))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.final_summary.total, 2);
    assert_eq!(report.records_accepted, 2);
    assert_eq!(report.duplicates, vec!["X".to_owned()]);
    assert!(aggregator.contains("X").await);
    assert_eq!(aggregator.snapshot().await.len(), 2);
}

/// Duplicates inside one scan are rejected the same way.
#[tokio::test(start_paused = true)]
async fn test_e2e_duplicate_within_one_scan() {
    let scanner = ScriptedScanner::new().sensor(1, &["A", "A", "B"]);

    let report = Orchestrator::builder()
        .scanner(Arc::new(scanner))
        .fleet(fleet([1], 1))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.final_summary.total, 2);
    assert_eq!(report.duplicates, vec!["A".to_owned()]);
}

/// A sensor that returns nothing is a success with zero records.
#[tokio::test(start_paused = true)]
async fn test_e2e_empty_scan_is_success() {
    let scanner = ScriptedScanner::new().sensor(1, &["A"]);

    let report = Orchestrator::builder()
        .scanner(Arc::new(scanner))
        .fleet(fleet([1, 2], 2))
        .build()
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.scans_succeeded, 2);
    assert_eq!(report.scans_failed, 0);
    assert_eq!(report.final_summary.total, 1);
}
