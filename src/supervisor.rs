//! # Supervisor Module
//!
//! Starts every worker, waits for an operator signal or a worker failure, and
//! drains worker completions before the process exits.
//!
//! ## Shutdown Paths
//!
//! | Trigger | Drain | Exit |
//! |---------|-------|------|
//! | Operator signal (SIGINT/SIGTERM) | all N workers, unbounded | success |
//! | Worker closes the cancellation signal | other N-1 workers, bounded by drain timeout | failure |
//!
//! Workers observe one shared [`CancellationToken`]. Closing it is
//! idempotent: any worker hitting a fatal error calls
//! [`WorkerHandle::fail`] without checking whether someone else already did.
//!
//! Every worker reports its [`WorkerId`] exactly once through its
//! [`WorkerHandle`]. A handle dropped without reporting (a panicking worker)
//! reports from `Drop`.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};
use tracing::{debug, error, info, warn};

use crate::error::ReceiverError;
use crate::workers::Worker;

/// Default bound on the emergency drain.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Position of a worker in the launch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkerId(pub usize);

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why the process is shutting down.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT or SIGTERM
    OperatorRequested,
    /// A worker hit an unrecoverable error
    WorkerFailure { worker: WorkerId, cause: String },
}

#[derive(Debug, Default)]
struct ShutdownState {
    closed: bool,
    fault: Option<(WorkerId, String)>,
}

/// Owner of the process-wide cancellation signal.
///
/// Cloned into every [`WorkerHandle`]. The first caller of
/// [`request_shutdown`](Self::request_shutdown) or
/// [`trigger_fatal`](Self::trigger_fatal) closes the signal and fixes the
/// shutdown reason; later calls are no-ops.
#[derive(Debug, Clone, Default)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    state: Arc<Mutex<ShutdownState>>,
}

impl ShutdownCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the signal for a graceful shutdown.
    ///
    /// Returns `true` if this call closed it.
    pub fn request_shutdown(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return false;
        }
        state.closed = true;
        self.token.cancel();
        true
    }

    /// Record `cause` as the shutdown reason and close the signal.
    ///
    /// Returns `true` if this call closed it. The fault is recorded before
    /// the signal closes, so anyone woken by the signal sees it.
    pub fn trigger_fatal(&self, worker: WorkerId, cause: impl Into<String>) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.closed {
            return false;
        }
        state.closed = true;
        state.fault = Some((worker, cause.into()));
        self.token.cancel();
        true
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the signal is closed.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }

    /// Reason fixed by whoever closed the signal.
    #[must_use]
    pub fn reason(&self) -> ShutdownReason {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        match &state.fault {
            Some((worker, cause)) => ShutdownReason::WorkerFailure {
                worker: *worker,
                cause: cause.clone(),
            },
            None => ShutdownReason::OperatorRequested,
        }
    }
}

/// A worker's view of the supervisor: the cancellation signal (read-only)
/// and its completion slot (write-once).
pub struct WorkerHandle {
    id: WorkerId,
    name: &'static str,
    coordinator: ShutdownCoordinator,
    done: Option<mpsc::UnboundedSender<WorkerId>>,
}

impl fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerHandle")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("reported", &self.done.is_none())
            .finish()
    }
}

impl WorkerHandle {
    pub fn new(
        id: WorkerId,
        name: &'static str,
        coordinator: ShutdownCoordinator,
        done: mpsc::UnboundedSender<WorkerId>,
    ) -> Self {
        Self {
            id,
            name,
            coordinator,
            done: Some(done),
        }
    }

    #[must_use]
    pub fn id(&self) -> WorkerId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.coordinator.is_cancelled()
    }

    /// Resolves once shutdown has been requested.
    pub fn cancelled(&self) -> WaitForCancellationFuture<'_> {
        self.coordinator.cancelled()
    }

    #[cfg(test)]
    pub(crate) fn coordinator(&self) -> &ShutdownCoordinator {
        &self.coordinator
    }

    /// Report a clean exit.
    pub fn complete(mut self) {
        self.report();
    }

    /// Fatal path: log, close the cancellation signal, then report.
    pub fn fail(self, err: ReceiverError) {
        error!(worker = self.name, id = %self.id, "Fatal error: {}", err);
        if !self.coordinator.trigger_fatal(self.id, err.to_string()) {
            debug!(worker = self.name, "Shutdown already in progress");
        }
        self.complete();
    }

    fn report(&mut self) {
        if let Some(done) = self.done.take() {
            if done.send(self.id).is_err() {
                debug!(worker = self.name, "Supervisor no longer listening");
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if self.done.is_none() {
            return;
        }

        if std::thread::panicking() {
            let err = ReceiverError::WorkerPanicked(self.name.to_string());
            error!(worker = self.name, id = %self.id, "{}", err);
            self.coordinator.trigger_fatal(self.id, err.to_string());
        } else {
            warn!(worker = self.name, id = %self.id, "Worker exited without reporting");
        }
        self.report();
    }
}

/// Outcome of a supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownReport {
    pub reason: ShutdownReason,
    /// Workers in the order their completion arrived
    pub completed: Vec<WorkerId>,
    /// Workers still running when the drain gave up
    pub abandoned: Vec<(WorkerId, &'static str)>,
}

impl ShutdownReport {
    /// True for an operator-requested shutdown.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.reason == ShutdownReason::OperatorRequested
    }
}

/// Launches workers and coordinates their shutdown.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use nunchuk_receiver::supervisor::Supervisor;
/// use nunchuk_receiver::workers::{heartbeat::Heartbeat, Worker};
///
/// #[tokio::main]
/// async fn main() {
///     let workers = vec![Worker::Heartbeat(Heartbeat::new(Duration::from_secs(2)))];
///     let report = Supervisor::new(Duration::from_secs(10))
///         .run(workers, async { let _ = tokio::signal::ctrl_c().await; })
///         .await;
///     assert!(report.is_success());
/// }
/// ```
#[derive(Debug)]
pub struct Supervisor {
    drain_timeout: Duration,
    coordinator: ShutdownCoordinator,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new(DEFAULT_DRAIN_TIMEOUT)
    }
}

impl Supervisor {
    #[must_use]
    pub fn new(drain_timeout: Duration) -> Self {
        Self {
            drain_timeout,
            coordinator: ShutdownCoordinator::new(),
        }
    }

    /// Run `workers` until `shutdown_signal` resolves or a worker fails.
    pub async fn run<F>(self, workers: Vec<Worker>, shutdown_signal: F) -> ShutdownReport
    where
        F: Future<Output = ()>,
    {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let mut pending = BTreeMap::new();

        for (index, worker) in workers.into_iter().enumerate() {
            let id = WorkerId(index);
            let name = worker.name();
            pending.insert(id, name);

            let handle = WorkerHandle::new(id, name, self.coordinator.clone(), done_tx.clone());
            info!(worker = name, id = index, "Starting worker");
            tokio::spawn(worker.run(handle));
        }
        drop(done_tx);

        let total = pending.len();
        let mut completed = Vec::with_capacity(total);

        let reason = tokio::select! {
            _ = shutdown_signal => {
                info!("Shutdown requested, stopping {} workers", total);
                self.coordinator.request_shutdown();
                self.coordinator.reason()
            }
            _ = self.coordinator.cancelled() => {
                error!("Error in some worker, emergency shutdown");
                self.coordinator.reason()
            }
        };

        match &reason {
            ShutdownReason::OperatorRequested => {
                while !pending.is_empty() {
                    match done_rx.recv().await {
                        Some(id) => record_completion(&mut pending, &mut completed, id),
                        None => break,
                    }
                }
                info!("All done");
            }
            ShutdownReason::WorkerFailure { worker, cause } => {
                warn!(worker = %worker, "Shutting down after worker failure: {}", cause);
                let failed = *worker;
                let deadline = Instant::now() + self.drain_timeout;

                while pending.keys().any(|id| *id != failed) {
                    tokio::select! {
                        msg = done_rx.recv() => match msg {
                            Some(id) => record_completion(&mut pending, &mut completed, id),
                            None => break,
                        },
                        _ = sleep_until(deadline) => {
                            warn!("Timeout after {:?}, stop waiting", self.drain_timeout);
                            break;
                        }
                    }
                }

                // The failing worker usually reported right after closing the signal
                while let Ok(id) = done_rx.try_recv() {
                    record_completion(&mut pending, &mut completed, id);
                }
            }
        }

        let abandoned: Vec<_> = pending.into_iter().collect();
        for (id, name) in &abandoned {
            warn!(worker = *name, id = %id, "Abandoning worker that did not finish");
        }

        ShutdownReport {
            reason,
            completed,
            abandoned,
        }
    }
}

fn record_completion(
    pending: &mut BTreeMap<WorkerId, &'static str>,
    completed: &mut Vec<WorkerId>,
    id: WorkerId,
) {
    match pending.remove(&id) {
        Some(name) => {
            info!(worker = name, id = %id, "Worker with id {} finished", id);
            completed.push(id);
        }
        None => warn!(id = %id, "Ignoring duplicate or unknown completion"),
    }
}
