//! A single sensor scan and the handle used to await its outcome.
//!
//! # Lifecycle
//!
//! ```text
//! Pending --run()--> Running --> Succeeded(n) | Failed
//! ```
//!
//! Terminal states are final. The task never retries.

use std::fmt;
use std::sync::Arc;

use tokio::sync::{oneshot, watch};
use tracing::{info, warn};

use stockwatch_core::error::ScanError;
use stockwatch_core::metrics as m;
use stockwatch_core::record::SensorId;
use stockwatch_core::scanner::{DynScanner, ScanOutcome};

/// Observable state of a scan task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Queued, not yet picked up by a worker.
    Pending,
    /// Running on a pool worker.
    Running,
    /// Finished with this many records.
    Succeeded(usize),
    /// The scanner reported a failure.
    Failed,
}

impl ScanState {
    /// Whether the task reached a final state.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Running => write!(f, "running"),
            Self::Succeeded(n) => write!(f, "succeeded({n})"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// One unit of scan work for one sensor.
pub struct ScanTask {
    sensor_id: SensorId,
    scanner: Arc<dyn DynScanner>,
    state_tx: watch::Sender<ScanState>,
    outcome_tx: oneshot::Sender<ScanOutcome>,
}

impl ScanTask {
    /// Create a pending task and the handle that observes it.
    pub fn new(sensor_id: SensorId, scanner: Arc<dyn DynScanner>) -> (Self, ScanHandle) {
        let (state_tx, state_rx) = watch::channel(ScanState::Pending);
        let (outcome_tx, outcome_rx) = oneshot::channel();
        let task = Self {
            sensor_id,
            scanner,
            state_tx,
            outcome_tx,
        };
        let handle = ScanHandle {
            sensor_id,
            state_rx,
            outcome_rx,
        };
        (task, handle)
    }

    /// Run the scan and publish its outcome to the handle.
    pub async fn run(self) {
        let Self {
            sensor_id,
            scanner,
            state_tx,
            outcome_tx,
        } = self;

        state_tx.send_replace(ScanState::Running);
        info!(sensor_id = sensor_id.get(), "started scanning (sensor {sensor_id})");

        let outcome = scanner.scan(sensor_id).await;

        match &outcome {
            Ok(records) => {
                info!(
                    sensor_id = sensor_id.get(),
                    retrieved = records.len(),
                    "finished scanning (sensor {sensor_id}). Retrieved: {} goods",
                    records.len()
                );
                metrics::counter!(m::SCAN_TASKS_TOTAL, m::LABEL_RESULT => "success").increment(1);
                state_tx.send_replace(ScanState::Succeeded(records.len()));
            }
            Err(e) => {
                warn!(sensor_id = sensor_id.get(), error = %e, "scan failed");
                metrics::counter!(m::SCAN_TASKS_TOTAL, m::LABEL_RESULT => "failure").increment(1);
                state_tx.send_replace(ScanState::Failed);
            }
        }

        // The consumer may already be gone after a forced shutdown.
        let _ = outcome_tx.send(outcome);
    }
}

/// Handle to a submitted scan task.
pub struct ScanHandle {
    sensor_id: SensorId,
    state_rx: watch::Receiver<ScanState>,
    outcome_rx: oneshot::Receiver<ScanOutcome>,
}

impl ScanHandle {
    /// Sensor this handle belongs to.
    pub fn sensor_id(&self) -> SensorId {
        self.sensor_id
    }

    /// Latest observed task state.
    pub fn state(&self) -> ScanState {
        *self.state_rx.borrow()
    }

    /// Wait for the task outcome.
    ///
    /// If the task is cancelled before it reports, this resolves to
    /// [`ScanError::Interrupted`] for this sensor only.
    pub async fn outcome(self) -> ScanOutcome {
        let sensor_id = self.sensor_id;
        self.outcome_rx
            .await
            .unwrap_or(Err(ScanError::Interrupted { sensor_id }))
    }
}

impl fmt::Debug for ScanHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScanHandle")
            .field("sensor_id", &self.sensor_id)
            .field("state", &self.state())
            .finish()
    }
}
