//! # Worker Pool
//!
//! Claims jobs from the task state store and runs them on a bounded number
//! of concurrent workers.
//!
//! ## Key Features
//!
//! - **Bounded concurrency**: a semaphore caps in-flight jobs at `concurrency`
//! - **Claim heartbeat**: a running job's visibility is refreshed so the
//!   store never hands it to a second worker
//! - **Panic capture**: a panicking job is recorded as `FAILURE` instead of
//!   taking the pool down
//! - **Graceful shutdown**: stops claiming, lets running pipelines stop at
//!   the next step boundary, then drains in-flight jobs within
//!   `shutdown_timeout`

use std::convert::Infallible;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::FutureExt;
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::config::TaskerConfig;
use crate::constants::status;
use crate::error::{Result, TaskerError};
use crate::messaging::{ClaimedJob, JobKind, ReceiptHandle, TaskId, TaskStateStore};
use crate::orchestration::worker::{TaskContext, TextTaskWorker};

/// Worker pool settings
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerPoolConfig {
    /// Maximum jobs executing at once
    pub concurrency: usize,
    /// Idle wait between empty claims
    pub poll_interval: Duration,
    /// How long a claimed job stays invisible to other consumers; refreshed
    /// at half this period while the job runs
    pub visibility_timeout: Duration,
    /// How long shutdown waits for in-flight jobs before abandoning them
    pub shutdown_timeout: Duration,
    /// Job kinds this pool consumes
    pub kinds: Vec<JobKind>,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            poll_interval: Duration::from_millis(100),
            visibility_timeout: Duration::from_secs(3600),
            shutdown_timeout: Duration::from_secs(30),
            kinds: JobKind::ALL.to_vec(),
        }
    }
}

impl WorkerPoolConfig {
    pub fn from_config(config: &TaskerConfig) -> Self {
        Self {
            concurrency: config.worker.concurrency,
            poll_interval: config.worker.poll_interval(),
            visibility_timeout: config.store.visibility_timeout(),
            shutdown_timeout: config.worker.shutdown_timeout(),
            kinds: JobKind::ALL.to_vec(),
        }
    }
}

/// A claimed job still executing
#[derive(Debug)]
struct InFlightJob {
    kind: JobKind,
    receipt: ReceiptHandle,
    handle: Option<JoinHandle<()>>,
}

type InFlightJobs = Arc<DashMap<TaskId, InFlightJob>>;

/// Running pool of text task workers
pub struct WorkerPool {
    config: WorkerPoolConfig,
    store: Arc<dyn TaskStateStore>,
    permits: Arc<Semaphore>,
    in_flight_jobs: InFlightJobs,
    shutdown_tx: watch::Sender<bool>,
    claim_loop: JoinHandle<()>,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("store", &self.store.provider_name())
            .field("available_permits", &self.permits.available_permits())
            .field("in_flight_jobs", &self.in_flight_jobs.len())
            .finish()
    }
}

impl WorkerPool {
    /// Spawn the claim loop on the current runtime
    ///
    /// The worker is re-bound to the pool's shutdown signal so running
    /// pipelines observe [`WorkerPool::shutdown`].
    pub fn start(
        store: Arc<dyn TaskStateStore>,
        worker: TextTaskWorker,
        config: WorkerPoolConfig,
    ) -> Result<Self> {
        if config.concurrency == 0 {
            return Err(TaskerError::ConfigurationError(
                "Worker pool concurrency must be at least 1".to_string(),
            ));
        }
        if config.kinds.is_empty() {
            return Err(TaskerError::ConfigurationError(
                "Worker pool must consume at least one job kind".to_string(),
            ));
        }
        if config.visibility_timeout.is_zero() {
            return Err(TaskerError::ConfigurationError(
                "Worker pool visibility timeout must be positive".to_string(),
            ));
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let worker = Arc::new(worker.with_shutdown(shutdown_rx.clone()));
        let permits = Arc::new(Semaphore::new(config.concurrency));
        let in_flight_jobs: InFlightJobs = Arc::new(DashMap::new());

        info!(
            worker_id = worker.worker_id(),
            concurrency = config.concurrency,
            kinds = ?config.kinds,
            store = store.provider_name(),
            "🚀 WORKER_POOL: Starting claim loop"
        );

        let claim_loop = tokio::spawn(Self::claim_loop(
            store.clone(),
            worker,
            config.clone(),
            permits.clone(),
            in_flight_jobs.clone(),
            shutdown_rx,
        ));

        Ok(Self {
            config,
            store,
            permits,
            in_flight_jobs,
            shutdown_tx,
            claim_loop,
        })
    }

    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }

    /// Jobs currently executing
    pub fn in_flight(&self) -> usize {
        self.config
            .concurrency
            .saturating_sub(self.permits.available_permits())
    }

    pub fn is_running(&self) -> bool {
        !*self.shutdown_tx.borrow() && !self.claim_loop.is_finished()
    }

    /// Stop claiming and wait for in-flight jobs to finish
    ///
    /// Jobs still running after `shutdown_timeout` are aborted, recorded as
    /// `FAILURE` and acknowledged; the call then returns a
    /// [`TaskerError::WorkerError`] naming how many were abandoned.
    pub async fn shutdown(self) -> Result<()> {
        info!(
            in_flight = self.in_flight(),
            timeout_ms = self.config.shutdown_timeout.as_millis() as u64,
            "🛑 WORKER_POOL: Shutdown requested"
        );
        // Receivers may already be gone if the loop exited on its own
        let _ = self.shutdown_tx.send(true);

        if let Err(e) = self.claim_loop.await {
            error!(error = %e, "Claim loop terminated abnormally");
        }

        let concurrency = u32::try_from(self.config.concurrency).map_err(|_| {
            TaskerError::Internal(format!(
                "Concurrency {} exceeds permit range",
                self.config.concurrency
            ))
        })?;

        match tokio::time::timeout(
            self.config.shutdown_timeout,
            self.permits.acquire_many(concurrency),
        )
        .await
        {
            Ok(Ok(_drained)) => {
                info!("✅ WORKER_POOL: All in-flight jobs drained");
                Ok(())
            }
            Ok(Err(e)) => Err(TaskerError::Internal(format!("Worker permits closed: {e}"))),
            Err(_) => {
                let abandoned =
                    Self::abandon_in_flight(self.store.as_ref(), &self.in_flight_jobs).await;
                Err(TaskerError::WorkerError(format!(
                    "Shutdown timed out after {}ms, abandoned {abandoned} in-flight job(s)",
                    self.config.shutdown_timeout.as_millis()
                )))
            }
        }
    }

    /// Abort jobs that outlived the drain and close them out as `FAILURE`
    async fn abandon_in_flight(store: &dyn TaskStateStore, in_flight_jobs: &InFlightJobs) -> usize {
        let task_ids: Vec<TaskId> = in_flight_jobs.iter().map(|e| e.key().clone()).collect();
        let mut abandoned = 0;

        for task_id in task_ids {
            let Some((task_id, job)) = in_flight_jobs.remove(&task_id) else {
                continue;
            };
            if let Some(handle) = job.handle {
                handle.abort();
                // Cancelled at its next await point
                let _ = handle.await;
            }
            abandoned += 1;

            warn!(task_id = %task_id, kind = %job.kind, "⚠️ WORKER_POOL: Abandoning in-flight job");
            if let Err(e) = store.store_failure(&task_id, status::WORKER_SHUTDOWN).await {
                error!(task_id = %task_id, error = %e, "Failed to record abandoned job as FAILURE");
            }
            if let Err(e) = store.ack(job.kind.queue_name(), &job.receipt).await {
                warn!(task_id = %task_id, error = %e, "Failed to acknowledge abandoned job");
            }
        }

        abandoned
    }

    async fn claim_loop(
        store: Arc<dyn TaskStateStore>,
        worker: Arc<TextTaskWorker>,
        config: WorkerPoolConfig,
        permits: Arc<Semaphore>,
        in_flight_jobs: InFlightJobs,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            let permit = tokio::select! {
                permit = permits.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            };

            match store.claim_next(&config.kinds, config.visibility_timeout).await {
                Ok(Some(job)) => {
                    let task_id = job.message.task_id.clone();
                    in_flight_jobs.insert(
                        task_id.clone(),
                        InFlightJob {
                            kind: job.message.kind,
                            receipt: job.receipt.clone(),
                            handle: None,
                        },
                    );

                    let handle = tokio::spawn({
                        let store = store.clone();
                        let worker = worker.clone();
                        let in_flight_jobs = in_flight_jobs.clone();
                        let task_id = task_id.clone();
                        let visibility_timeout = config.visibility_timeout;
                        async move {
                            Self::run_job(store, worker, job, visibility_timeout).await;
                            in_flight_jobs.remove(&task_id);
                            drop(permit);
                        }
                    });

                    // Absent when the job already finished
                    if let Some(mut entry) = in_flight_jobs.get_mut(&task_id) {
                        entry.handle = Some(handle);
                    }
                }
                Ok(None) => {
                    drop(permit);
                    tokio::select! {
                        _ = store.wait_for_jobs(config.poll_interval) => {}
                        changed = shutdown_rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                }
                Err(e) => {
                    drop(permit);
                    warn!(error = %e, "Failed to claim job, backing off");
                    tokio::select! {
                        _ = tokio::time::sleep(config.poll_interval) => {}
                        changed = shutdown_rx.changed() => {
                            if changed.is_err() {
                                break;
                            }
                        }
                    }
                }
            }
        }

        debug!("Claim loop stopped");
    }

    async fn run_job(
        store: Arc<dyn TaskStateStore>,
        worker: Arc<TextTaskWorker>,
        job: ClaimedJob,
        visibility_timeout: Duration,
    ) {
        let ClaimedJob {
            message,
            receipt,
            receive_count,
        } = job;
        let ctx = TaskContext::new(message.task_id.clone(), store.clone());

        debug!(
            task_id = %message.task_id,
            kind = %message.kind,
            receive_count,
            age_ms = message.age_ms(),
            correlation_id = %message.metadata.correlation_id,
            "Job claimed"
        );

        let execution = AssertUnwindSafe(worker.execute(&ctx, &message)).catch_unwind();
        let heartbeat = Self::keep_claimed(
            store.as_ref(),
            message.queue_name(),
            &receipt,
            &message.task_id,
            visibility_timeout,
        );
        let outcome = tokio::select! {
            outcome = execution => outcome,
            never = heartbeat => match never {},
        };

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(task_id = %message.task_id, error = %e, "Failed to record task outcome");
            }
            Err(panic) => {
                let detail = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(task_id = %message.task_id, panic = %detail, "Worker panicked");
                if let Err(e) = ctx.fail(&format!("Worker panicked: {detail}")).await {
                    error!(task_id = %message.task_id, error = %e, "Failed to record panic as FAILURE");
                }
            }
        }

        if let Err(e) = store.ack(message.queue_name(), &receipt).await {
            warn!(task_id = %message.task_id, error = %e, "Failed to acknowledge job");
        }
    }

    /// Refresh the claim at half the visibility timeout until dropped
    async fn keep_claimed(
        store: &dyn TaskStateStore,
        queue_name: &str,
        receipt: &ReceiptHandle,
        task_id: &TaskId,
        visibility_timeout: Duration,
    ) -> Infallible {
        let period = (visibility_timeout / 2).max(Duration::from_millis(1));
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match store
                .extend_visibility(queue_name, receipt, visibility_timeout)
                .await
            {
                Ok(()) => debug!(task_id = %task_id, "Claim visibility extended"),
                Err(e) => warn!(task_id = %task_id, error = %e, "Failed to extend claim visibility"),
            }
        }
    }
}
