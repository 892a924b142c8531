//! Liveness marker in the logs, every couple of seconds until shutdown.

use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use crate::supervisor::WorkerHandle;

/// Logs a heartbeat at a fixed interval
#[derive(Debug, Clone)]
pub struct Heartbeat {
    interval: Duration,
}

impl Heartbeat {
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub async fn run(self, handle: WorkerHandle) {
        info!("Starting heartbeat");

        let mut beats: u64 = 0;
        loop {
            beats += 1;
            info!(beats, "Heartbeat");

            tokio::select! {
                _ = handle.cancelled() => break,
                _ = sleep(self.interval) => {}
            }
        }

        info!("Shutdown heartbeat after {} beats", beats);
        handle.complete();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::supervisor::{ShutdownCoordinator, WorkerId};
    use tokio::sync::mpsc;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_stops_promptly_on_cancel() {
        let coordinator = ShutdownCoordinator::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = WorkerHandle::new(WorkerId(0), "heartbeat", coordinator.clone(), tx);

        let task = tokio::spawn(Heartbeat::new(Duration::from_secs(2)).run(handle));

        tokio::time::sleep(Duration::from_secs(5)).await;
        let cancelled_at = Instant::now();
        coordinator.request_shutdown();

        assert_eq!(rx.recv().await, Some(WorkerId(0)));
        assert!(cancelled_at.elapsed() < Duration::from_secs(2));
        task.await.unwrap();
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.request_shutdown();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = WorkerHandle::new(WorkerId(4), "heartbeat", coordinator, tx);

        Heartbeat::new(Duration::from_secs(2)).run(handle).await;
        assert_eq!(rx.recv().await, Some(WorkerId(4)));
    }
}
