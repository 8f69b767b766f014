//! Periodic inventory reporter.
//!
//! Runs on a dedicated task with a fixed-rate schedule: the first run starts
//! immediately and run `k` targets `start + k * period` regardless of how long
//! earlier runs took. Runs never overlap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use stockwatch_core::metrics as m;
use stockwatch_core::scanner::BoxFuture;
use stockwatch_inventory::Aggregator;

use crate::orchestrator::PhaseOutcome;

/// Context tag attached to periodic summaries.
pub const REPORTER_CONTEXT: &str = "reporter";

/// Handle to the running reporter task.
pub struct Reporter {
    stop: CancellationToken,
    task: Option<JoinHandle<()>>,
    runs: Arc<AtomicU64>,
}

impl Reporter {
    /// Start reporting `aggregator` summaries every `period`.
    pub fn spawn(aggregator: Arc<Aggregator>, period: Duration) -> Self {
        Self::spawn_with(period, move || -> BoxFuture<'static, ()> {
            let aggregator = Arc::clone(&aggregator);
            Box::pin(async move {
                let summary = aggregator.summary(REPORTER_CONTEXT).await;
                info!(
                    count = summary.total,
                    context = %summary.context,
                    "{summary}"
                );
            })
        })
    }

    /// Start a reporter that runs `job` on the fixed-rate schedule.
    pub fn spawn_with<F>(period: Duration, mut job: F) -> Self
    where
        F: FnMut() -> BoxFuture<'static, ()> + Send + 'static,
    {
        let stop = CancellationToken::new();
        let runs = Arc::new(AtomicU64::new(0));

        let task = {
            let stop = stop.clone();
            let runs = Arc::clone(&runs);
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(period);
                // Late ticks fire back to back so the schedule keeps its origin.
                interval.set_missed_tick_behavior(MissedTickBehavior::Burst);

                debug!(period_ms = period.as_millis() as u64, "reporter started");
                loop {
                    tokio::select! {
                        biased;
                        _ = stop.cancelled() => {
                            debug!("reporter stop requested, no further runs scheduled");
                            break;
                        }
                        _ = interval.tick() => {
                            runs.fetch_add(1, Ordering::SeqCst);
                            metrics::counter!(m::REPORTER_RUNS_TOTAL).increment(1);
                            job().await;
                        }
                    }
                }
            })
        };

        Self {
            stop,
            task: Some(task),
            runs,
        }
    }

    /// Number of runs started so far.
    pub fn runs(&self) -> u64 {
        self.runs.load(Ordering::SeqCst)
    }

    /// Whether the reporter task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop scheduling runs and wait up to `timeout` for an in-flight run.
    ///
    /// Past the bound, or if `interrupt` fires while waiting, the task is
    /// aborted.
    pub async fn shutdown(
        &mut self,
        timeout: Duration,
        interrupt: &CancellationToken,
    ) -> PhaseOutcome {
        let Some(mut task) = self.task.take() else {
            return PhaseOutcome::Drained;
        };

        self.stop.cancel();
        info!("Shutdown reporting executor initiated.");
        info!(
            timeout_secs = timeout.as_secs(),
            "Reporting executor termination await initiated."
        );

        // A task that already exited counts as drained even if interrupted.
        let outcome = tokio::select! {
            biased;
            result = tokio::time::timeout(timeout, &mut task) => match result {
                Ok(Ok(())) => return PhaseOutcome::Drained,
                Ok(Err(e)) => {
                    warn!(error = %e, "reporter task ended abnormally");
                    return PhaseOutcome::Drained;
                }
                Err(_) => {
                    warn!(
                        timeout_secs = timeout.as_secs(),
                        "reporter did not stop in time, forcing cancellation"
                    );
                    PhaseOutcome::ForcedCancel { cancelled: 1 }
                }
            },
            _ = interrupt.cancelled() => {
                warn!("wait for reporter shutdown interrupted, forcing cancellation");
                PhaseOutcome::Interrupted { cancelled: 1 }
            }
        };

        task.abort();
        metrics::counter!(m::SHUTDOWN_FORCED_CANCEL_TOTAL, m::LABEL_PHASE => "report")
            .increment(1);
        outcome
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        self.stop.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
