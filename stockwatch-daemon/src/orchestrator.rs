//! Scan orchestration -- dispatch, result consumption, and bounded shutdown.
//!
//! The [`Orchestrator`] is the central coordinator of `stockwatch-daemon`.
//! It owns the scan worker pool, the tracked set of result consumers, and the
//! reporter schedule. The [`Aggregator`] is created once (or injected) and
//! shared with every consumer and the reporter.
//!
//! # Lifecycle
//!
//! ```text
//! Created -> Submitting -> AwaitingScanShutdown -> AwaitingReportShutdown -> Terminated
//! ```
//!
//! # Shutdown
//!
//! 1. Scan phase: close the pool, let queued and in-flight scans and their
//!    consumers finish within the scan drain timeout, otherwise abort them.
//! 2. Report phase: stop scheduling reporter runs, let an in-flight run
//!    finish within the report drain timeout, otherwise abort it.
//!
//! Each phase has its own bound. A final summary is emitted however either
//! phase ended.

use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use stockwatch_core::config::{FleetConfig, StockwatchConfig};
use stockwatch_core::error::{PoolError, ScanError};
use stockwatch_core::metrics as m;
use stockwatch_core::record::SensorId;
use stockwatch_core::scanner::DynScanner;
use stockwatch_inventory::{Aggregator, BatchReport, Summary};

use crate::pool::WorkerPool;
use crate::reporter::Reporter;
use crate::scan_task::{ScanHandle, ScanTask};

/// Context tag attached to the final summary.
pub const FINAL_CONTEXT: &str = "final";

/// Orchestrator lifecycle state. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OrchestratorState {
    /// Built, nothing started.
    Created,
    /// Reporter running, scans being submitted and consumed.
    Submitting,
    /// Scan pool closed, waiting for it to drain.
    AwaitingScanShutdown,
    /// Reporter stopping, waiting for it to finish.
    AwaitingReportShutdown,
    /// Final summary emitted.
    Terminated,
}

impl fmt::Display for OrchestratorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Submitting => write!(f, "submitting"),
            Self::AwaitingScanShutdown => write!(f, "awaiting_scan_shutdown"),
            Self::AwaitingReportShutdown => write!(f, "awaiting_report_shutdown"),
            Self::Terminated => write!(f, "terminated"),
        }
    }
}

/// How a shutdown phase ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseOutcome {
    /// Everything finished within the bound.
    Drained,
    /// The bound was exceeded and cancellation was requested.
    ForcedCancel {
        /// Tasks that were still alive when cancellation was requested.
        cancelled: usize,
    },
    /// The wait itself was interrupted and cancellation was requested.
    Interrupted {
        /// Tasks that were still alive when cancellation was requested.
        cancelled: usize,
    },
}

impl PhaseOutcome {
    /// Whether the phase ended without forced cancellation.
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Drained)
    }
}

/// What a single consumer did with its scan outcome.
#[derive(Debug)]
enum Consumed {
    Aggregated {
        sensor_id: SensorId,
        batch: BatchReport,
    },
    Failed {
        sensor_id: SensorId,
    },
    Interrupted {
        sensor_id: SensorId,
    },
}

/// Result of a full orchestration run.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Summary taken after both shutdown phases.
    pub final_summary: Summary,
    /// Scan tasks accepted by the pool.
    pub submitted: usize,
    /// Consumers that aggregated a successful scan.
    pub scans_succeeded: usize,
    /// Consumers whose scan failed in the collaborator.
    pub scans_failed: usize,
    /// Consumers whose wait was interrupted.
    pub scans_interrupted: usize,
    /// Consumers that had not finished when the scan phase ended.
    pub scans_unfinished: usize,
    /// Records accepted into the inventory by this run.
    pub records_accepted: usize,
    /// Record ids rejected as duplicates, in rejection order.
    pub duplicates: Vec<String>,
    /// Sensors whose scan failed or whose wait was interrupted.
    pub failed_sensors: Vec<SensorId>,
    /// How the scan phase ended.
    pub scan_phase: PhaseOutcome,
    /// How the report phase ended.
    pub report_phase: PhaseOutcome,
}

#[derive(Debug, Default)]
struct ScanTally {
    succeeded: usize,
    failed: usize,
    interrupted: usize,
    accepted: usize,
    duplicates: Vec<String>,
    failed_sensors: Vec<SensorId>,
}

impl ScanTally {
    fn record(&mut self, consumed: Consumed) {
        match consumed {
            Consumed::Aggregated { sensor_id, batch } => {
                debug!(
                    sensor_id = sensor_id.get(),
                    accepted = batch.accepted,
                    duplicates = batch.rejected(),
                    "scan result aggregated"
                );
                self.succeeded += 1;
                self.accepted += batch.accepted;
                self.duplicates.extend(batch.duplicates);
            }
            Consumed::Failed { sensor_id } => {
                self.failed += 1;
                self.failed_sensors.push(sensor_id);
            }
            Consumed::Interrupted { sensor_id } => {
                self.interrupted += 1;
                self.failed_sensors.push(sensor_id);
            }
        }
    }

    fn finished(&self) -> usize {
        self.succeeded + self.failed + self.interrupted
    }
}

/// The scan orchestrator.
///
/// Build with [`Orchestrator::builder`], then either call [`run`](Self::run)
/// for the whole lifecycle or drive [`submit`](Self::submit),
/// [`consume_all`](Self::consume_all) and [`shutdown`](Self::shutdown) by hand.
pub struct Orchestrator {
    config: StockwatchConfig,
    fleet: FleetConfig,
    state: OrchestratorState,
    scanner: Arc<dyn DynScanner>,
    aggregator: Arc<Aggregator>,
    pool: WorkerPool,
    consumers: JoinSet<Consumed>,
    reporter: Option<Reporter>,
    /// Interrupts the bounded shutdown waits (e.g. on SIGINT).
    interrupt: CancellationToken,
    tally: ScanTally,
    submitted: usize,
}

impl Orchestrator {
    /// Start building an orchestrator.
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OrchestratorState {
        self.state
    }

    /// The shared inventory.
    pub fn aggregator(&self) -> Arc<Aggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Token that interrupts the shutdown waits when cancelled.
    pub fn interrupt_token(&self) -> CancellationToken {
        self.interrupt.clone()
    }

    /// Get a reference to the loaded configuration.
    pub fn config(&self) -> &StockwatchConfig {
        &self.config
    }

    /// Start the reporter schedule and enter the submitting state.
    ///
    /// Idempotent once started.
    pub fn start(&mut self) {
        if self.state != OrchestratorState::Created {
            return;
        }
        self.reporter = Some(Reporter::spawn(
            Arc::clone(&self.aggregator),
            self.config.report.interval(),
        ));
        self.transition(OrchestratorState::Submitting);
    }

    /// Enqueue a scan for `sensor_id` and return its handle immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] once the scan phase has begun.
    pub fn submit(&mut self, sensor_id: SensorId) -> Result<ScanHandle, PoolError> {
        let (task, handle) = ScanTask::new(sensor_id, Arc::clone(&self.scanner));
        self.pool.submit(task.run())?;
        self.submitted += 1;
        debug!(sensor_id = sensor_id.get(), "scan task submitted");
        Ok(handle)
    }

    /// Spawn one tracked consumer per handle.
    ///
    /// Each consumer waits for its own scan and forwards successful records
    /// to the aggregator. A failed or interrupted scan affects only its own
    /// consumer.
    pub fn consume_all(&mut self, handles: impl IntoIterator<Item = ScanHandle>) {
        for handle in handles {
            let aggregator = Arc::clone(&self.aggregator);
            self.consumers.spawn(consume(handle, aggregator));
        }
    }

    /// Run the full lifecycle over the configured fleet.
    ///
    /// Always reaches [`OrchestratorState::Terminated`] and returns a final
    /// summary, even when a shutdown phase had to force cancellation.
    pub async fn run(mut self) -> Result<RunReport> {
        self.start();

        let sensor_ids = self.fleet.sensor_ids.clone();
        let mut handles = Vec::with_capacity(sensor_ids.len());
        for sensor_id in sensor_ids {
            match self.submit(sensor_id) {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    error!(sensor_id = sensor_id.get(), error = %e, "failed to submit scan task");
                }
            }
        }
        info!(
            submitted = handles.len(),
            pool_capacity = self.pool.capacity(),
            "scan tasks submitted"
        );

        self.consume_all(handles);
        Ok(self.shutdown().await)
    }

    /// Run both shutdown phases and emit the final summary.
    pub async fn shutdown(&mut self) -> RunReport {
        let scan_phase = self.shutdown_scans().await;
        let report_phase = self.shutdown_reporter().await;

        let final_summary = self.aggregator.summary(FINAL_CONTEXT).await;
        info!(
            count = final_summary.total,
            context = %final_summary.context,
            "{final_summary}"
        );
        self.transition(OrchestratorState::Terminated);
        info!("All scanning tasks completed. Program ending.");

        let tally = std::mem::take(&mut self.tally);
        RunReport {
            final_summary,
            submitted: self.submitted,
            scans_succeeded: tally.succeeded,
            scans_failed: tally.failed,
            scans_interrupted: tally.interrupted,
            scans_unfinished: self.submitted.saturating_sub(tally.finished()),
            records_accepted: tally.accepted,
            duplicates: tally.duplicates,
            failed_sensors: tally.failed_sensors,
            scan_phase,
            report_phase,
        }
    }

    /// Phase 1: drain the scan pool and consumers within the scan bound.
    async fn shutdown_scans(&mut self) -> PhaseOutcome {
        self.transition(OrchestratorState::AwaitingScanShutdown);

        self.pool.close();
        info!("Shutdown scanning executor initiated.");

        let timeout = self.config.shutdown.scan_drain_timeout();
        info!(
            timeout_secs = timeout.as_secs(),
            "Scanning executor termination await initiated."
        );

        let drained = {
            let drain = drain_scans(&mut self.pool, &mut self.consumers, &mut self.tally);
            tokio::select! {
                result = tokio::time::timeout(timeout, drain) => result.is_ok(),
                _ = self.interrupt.cancelled() => {
                    warn!("wait for scan shutdown interrupted, forcing cancellation");
                    let cancelled = self.force_cancel_scans();
                    return PhaseOutcome::Interrupted { cancelled };
                }
            }
        };

        if drained {
            info!("scanning executor terminated");
            return PhaseOutcome::Drained;
        }

        warn!(
            timeout_secs = timeout.as_secs(),
            "scan tasks did not finish in time, forcing cancellation"
        );
        let cancelled = self.force_cancel_scans();
        PhaseOutcome::ForcedCancel { cancelled }
    }

    /// Abort every pool worker and consumer still alive.
    fn force_cancel_scans(&mut self) -> usize {
        while let Some(result) = self.consumers.try_join_next() {
            collect_consumer(&mut self.tally, result);
        }
        let workers = self.pool.abort();
        let consumers = self.consumers.len();
        self.consumers.abort_all();
        metrics::counter!(m::SHUTDOWN_FORCED_CANCEL_TOTAL, m::LABEL_PHASE => "scan").increment(1);
        warn!(workers, consumers, "forced cancellation of scan tasks requested");
        workers + consumers
    }

    /// Phase 2: stop the reporter within the report bound.
    async fn shutdown_reporter(&mut self) -> PhaseOutcome {
        self.transition(OrchestratorState::AwaitingReportShutdown);

        let Some(mut reporter) = self.reporter.take() else {
            return PhaseOutcome::Drained;
        };
        let timeout = self.config.shutdown.report_drain_timeout();
        reporter.shutdown(timeout, &self.interrupt).await
    }

    fn transition(&mut self, next: OrchestratorState) {
        if next <= self.state {
            return;
        }
        debug!(from = %self.state, to = %next, "orchestrator state transition");
        self.state = next;
    }
}

/// Wait for the pool and every consumer, tallying consumers as they finish.
async fn drain_scans(
    pool: &mut WorkerPool,
    consumers: &mut JoinSet<Consumed>,
    tally: &mut ScanTally,
) {
    let collect = async {
        while let Some(result) = consumers.join_next().await {
            collect_consumer(tally, result);
        }
    };
    tokio::join!(pool.join(), collect);
}

fn collect_consumer(tally: &mut ScanTally, result: Result<Consumed, tokio::task::JoinError>) {
    match result {
        Ok(consumed) => tally.record(consumed),
        Err(e) if e.is_panic() => error!(error = %e, "result consumer panicked"),
        Err(_) => {}
    }
}

/// Wait for one scan outcome and forward its records to the aggregator.
async fn consume(handle: ScanHandle, aggregator: Arc<Aggregator>) -> Consumed {
    let sensor_id = handle.sensor_id();
    match handle.outcome().await {
        Ok(records) => {
            let batch = aggregator.add_items(records).await;
            Consumed::Aggregated { sensor_id, batch }
        }
        Err(ScanError::Interrupted { .. }) => {
            warn!(
                sensor_id = sensor_id.get(),
                "interrupted while waiting for scan result"
            );
            Consumed::Interrupted { sensor_id }
        }
        Err(e) => {
            error!(
                sensor_id = sensor_id.get(),
                error = %e,
                "a scanning task failed, contributing no records"
            );
            Consumed::Failed { sensor_id }
        }
    }
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    config: StockwatchConfig,
    fleet: FleetConfig,
    scanner: Option<Arc<dyn DynScanner>>,
    aggregator: Option<Arc<Aggregator>>,
}

impl OrchestratorBuilder {
    /// Create a builder with default config and fleet.
    pub fn new() -> Self {
        Self {
            config: StockwatchConfig::default(),
            fleet: FleetConfig::default(),
            scanner: None,
            aggregator: None,
        }
    }

    /// Set the runtime configuration.
    pub fn config(mut self, config: StockwatchConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the sensor ids and pool capacity.
    pub fn fleet(mut self, fleet: FleetConfig) -> Self {
        self.fleet = fleet;
        self
    }

    /// Set the scan collaborator. Required.
    pub fn scanner(mut self, scanner: Arc<dyn DynScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// Share an existing aggregator instead of creating a fresh one.
    pub fn aggregator(mut self, aggregator: Arc<Aggregator>) -> Self {
        self.aggregator = Some(aggregator);
        self
    }

    /// Validate the configuration and build the orchestrator.
    ///
    /// Must be called inside a tokio runtime because the pool workers are
    /// spawned here.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the pool capacity
    /// is zero, or no scanner was set.
    pub fn build(self) -> Result<Orchestrator> {
        self.config
            .validate()
            .map_err(|e| anyhow::anyhow!("config validation failed: {}", e))?;
        self.fleet.validate()?;
        let scanner = self
            .scanner
            .ok_or_else(|| anyhow::anyhow!("a scanner is required to build the orchestrator"))?;

        let pool = WorkerPool::new(self.fleet.pool_capacity)?;
        let aggregator = self.aggregator.unwrap_or_default();

        info!(
            sensors = self.fleet.sensor_ids.len(),
            pool_capacity = self.fleet.pool_capacity,
            report_interval_secs = self.config.report.interval_secs,
            "orchestrator initialized"
        );

        Ok(Orchestrator {
            config: self.config,
            fleet: self.fleet,
            state: OrchestratorState::Created,
            scanner,
            aggregator,
            pool,
            consumers: JoinSet::new(),
            reporter: None,
            interrupt: CancellationToken::new(),
            tally: ScanTally::default(),
            submitted: 0,
        })
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
///
/// Returns the name of the signal that triggered the shutdown.
///
/// # Errors
///
/// Returns an error if signal handlers cannot be installed.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("failed to install SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("failed to install SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for Ctrl+C.
#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("failed to install Ctrl+C handler: {}", e))?;
    Ok("CTRL_C")
}
