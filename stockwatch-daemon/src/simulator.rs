//! Simulated sensor collaborator used by the daemon binary.
//!
//! Each scan sleeps a per-sensor latency and returns records drawn from a
//! small shared SKU space, so neighbouring sensors report overlapping ids
//! and the aggregator sees real duplicates.

use std::collections::HashSet;
use std::time::Duration;

use tracing::debug;
use uuid::Uuid;

use stockwatch_core::error::ScanError;
use stockwatch_core::record::{Record, SensorId};
use stockwatch_core::scanner::{ScanOutcome, Scanner};

/// Default number of distinct SKUs shared by all sensors.
pub const DEFAULT_SKU_SPACE: u32 = 24;
/// Default number of records per scan.
pub const DEFAULT_ITEMS_PER_SCAN: u32 = 5;

/// Deterministic fake scanner.
#[derive(Debug, Clone)]
pub struct SimulatedScanner {
    base_latency: Duration,
    latency_step: Duration,
    items_per_scan: u32,
    sku_space: u32,
    failing: HashSet<SensorId>,
}

impl SimulatedScanner {
    /// Create a scanner with the default SKU space and latencies.
    pub fn new() -> Self {
        Self {
            base_latency: Duration::from_millis(500),
            latency_step: Duration::from_millis(250),
            items_per_scan: DEFAULT_ITEMS_PER_SCAN,
            sku_space: DEFAULT_SKU_SPACE,
            failing: HashSet::new(),
        }
    }

    /// Set the latency model: `base + sensor_id * step`.
    pub fn latency(mut self, base: Duration, step: Duration) -> Self {
        self.base_latency = base;
        self.latency_step = step;
        self
    }

    /// Set how many records each scan returns.
    pub fn items_per_scan(mut self, items: u32) -> Self {
        self.items_per_scan = items;
        self
    }

    /// Set the size of the shared SKU space. Zero is treated as one.
    pub fn sku_space(mut self, space: u32) -> Self {
        self.sku_space = space.max(1);
        self
    }

    /// Make scans of `sensor_id` fail.
    pub fn fail_sensor(mut self, sensor_id: SensorId) -> Self {
        self.failing.insert(sensor_id);
        self
    }

    /// Latency applied to `sensor_id`.
    pub fn latency_for(&self, sensor_id: SensorId) -> Duration {
        self.base_latency + self.latency_step * sensor_id.get()
    }

    /// SKU ids `sensor_id` reports, in order.
    ///
    /// Sensor `n` starts at slot `2n`, so adjacent sensors share ids.
    pub fn sku_ids(&self, sensor_id: SensorId) -> Vec<String> {
        let start = sensor_id.get().wrapping_mul(2);
        (0..self.items_per_scan)
            .map(|i| format!("SKU-{:04}", start.wrapping_add(i) % self.sku_space))
            .collect()
    }

    fn payload(sensor_id: SensorId, scan_id: Uuid, sku: &str) -> Vec<u8> {
        serde_json::json!({
            "sensor_id": sensor_id.get(),
            "scan_id": scan_id.to_string(),
            "sku": sku,
        })
        .to_string()
        .into_bytes()
    }
}

impl Default for SimulatedScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for SimulatedScanner {
    async fn scan(&self, sensor_id: SensorId) -> ScanOutcome {
        tokio::time::sleep(self.latency_for(sensor_id)).await;

        if self.failing.contains(&sensor_id) {
            return Err(ScanError::collaborator(sensor_id, "sensor did not respond"));
        }

        let scan_id = Uuid::new_v4();
        debug!(sensor_id = sensor_id.get(), %scan_id, "simulated scan complete");
        Ok(self
            .sku_ids(sensor_id)
            .into_iter()
            .map(|sku| {
                let payload = Self::payload(sensor_id, scan_id, &sku);
                Record::new(sku, payload)
            })
            .collect())
    }
}
