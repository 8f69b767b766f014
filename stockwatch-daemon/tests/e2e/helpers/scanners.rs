//! Scripted scanners for E2E tests.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use stockwatch_core::error::ScanError;
use stockwatch_core::record::{Record, SensorId};
use stockwatch_core::scanner::{ScanOutcome, Scanner};

/// Returns a fixed list of ids per sensor after an optional delay.
///
/// Sensors marked `failing` return a collaborator error, sensors marked
/// `stuck` never complete, and unknown sensors return an empty list.
#[derive(Default)]
pub struct ScriptedScanner {
    ids: HashMap<SensorId, Vec<String>>,
    failing: HashSet<SensorId>,
    stuck: HashSet<SensorId>,
    delay: Duration,
    started: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl ScriptedScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sensor(mut self, id: u32, ids: &[&str]) -> Self {
        self.ids.insert(
            SensorId::new(id),
            ids.iter().map(|s| (*s).to_owned()).collect(),
        );
        self
    }

    pub fn failing(mut self, id: u32) -> Self {
        self.failing.insert(SensorId::new(id));
        self
    }

    pub fn stuck(mut self, id: u32) -> Self {
        self.stuck.insert(SensorId::new(id));
        self
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Counter of scans that reached the scanner.
    pub fn started(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.started)
    }
}

impl Scanner for ScriptedScanner {
    async fn scan(&self, sensor_id: SensorId) -> ScanOutcome {
        self.started.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.stuck.contains(&sensor_id) {
            std::future::pending::<()>().await;
        }
        if self.failing.contains(&sensor_id) {
            return Err(ScanError::collaborator(sensor_id, "scripted failure"));
        }
        Ok(self
            .ids
            .get(&sensor_id)
            .map(|ids| ids.iter().map(Record::with_id).collect())
            .unwrap_or_default())
    }
}
