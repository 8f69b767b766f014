//! Fixed-capacity worker pool for scan tasks.
//!
//! `capacity` worker tasks pull jobs from one FIFO queue, so at most
//! `capacity` jobs run at once and queued jobs start in submission order.
//! [`WorkerPool::submit`] never blocks.
//!
//! # Lifecycle
//!
//! ```text
//! open --close()--> closed (queue drains) --join()--> drained
//!                     \--abort()--> cancelled (best-effort)
//! ```

use std::future::Future;
use std::sync::Arc;

use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error};

use stockwatch_core::error::PoolError;
use stockwatch_core::scanner::BoxFuture;

type Job = BoxFuture<'static, ()>;

/// A bounded pool of worker tasks fed from a FIFO job queue.
pub struct WorkerPool {
    capacity: usize,
    /// Job queue sender; `None` once the pool stops accepting work.
    job_tx: Option<mpsc::UnboundedSender<Job>>,
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Spawn `capacity` workers on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidCapacity`] when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity(capacity));
        }

        let (job_tx, job_rx) = mpsc::unbounded_channel::<Job>();
        let job_rx = Arc::new(Mutex::new(job_rx));

        let mut workers = JoinSet::new();
        for worker_id in 0..capacity {
            workers.spawn(worker_loop(worker_id, Arc::clone(&job_rx)));
        }

        debug!(capacity, "worker pool started");
        Ok(Self {
            capacity,
            job_tx: Some(job_tx),
            workers,
        })
    }

    /// Maximum number of concurrently running jobs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the pool has stopped accepting submissions.
    pub fn is_closed(&self) -> bool {
        self.job_tx.is_none()
    }

    /// Number of workers still alive.
    pub fn live_workers(&self) -> usize {
        self.workers.len()
    }

    /// Enqueue a job. Returns immediately.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Closed`] after [`close`](Self::close) or
    /// [`abort`](Self::abort).
    pub fn submit<F>(&self, job: F) -> Result<(), PoolError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let tx = self.job_tx.as_ref().ok_or(PoolError::Closed)?;
        tx.send(Box::pin(job)).map_err(|_| PoolError::Closed)
    }

    /// Stop accepting new jobs. Queued and running jobs still complete.
    pub fn close(&mut self) {
        if self.job_tx.take().is_some() {
            debug!("worker pool closed to new submissions");
        }
    }

    /// Wait for every worker to exit.
    ///
    /// Workers exit once the pool is closed and the queue is empty, so call
    /// [`close`](Self::close) first or this waits forever.
    pub async fn join(&mut self) {
        while let Some(result) = self.workers.join_next().await {
            if let Err(e) = result {
                if e.is_panic() {
                    error!(error = %e, "scan worker panicked");
                }
            }
        }
    }

    /// Request cancellation of every worker and the jobs they run.
    ///
    /// Queued jobs are dropped with the queue. A job that never yields may
    /// keep running in the background. Returns the number of workers that
    /// were still alive.
    pub fn abort(&mut self) -> usize {
        self.close();
        let alive = self.workers.len();
        self.workers.abort_all();
        alive
    }
}

async fn worker_loop(worker_id: usize, job_rx: Arc<Mutex<mpsc::UnboundedReceiver<Job>>>) {
    loop {
        // Hold the queue lock only while waiting for the next job.
        let job = {
            let mut rx = job_rx.lock().await;
            rx.recv().await
        };
        match job {
            Some(job) => job.await,
            None => {
                debug!(worker_id, "job queue closed, worker exiting");
                break;
            }
        }
    }
}
