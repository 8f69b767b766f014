//! Config builders for E2E tests.

use stockwatch_core::config::{FleetConfig, StockwatchConfig};
use stockwatch_core::record::SensorId;

/// Config with the given drain bounds and a 5s report interval.
#[allow(dead_code)]
pub fn config_with_bounds(scan_secs: u64, report_secs: u64) -> StockwatchConfig {
    let mut config = StockwatchConfig::default();
    config.shutdown.scan_drain_timeout_secs = scan_secs;
    config.shutdown.report_drain_timeout_secs = report_secs;
    config
}

/// Fleet over the given raw sensor ids.
#[allow(dead_code)]
pub fn fleet(ids: impl IntoIterator<Item = u32>, capacity: usize) -> FleetConfig {
    FleetConfig::new(ids.into_iter().map(SensorId::new), capacity)
}
