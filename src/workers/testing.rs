//! Scripted workers for exercising the supervisor.

use std::time::Duration;

use super::Worker;
use crate::error::ReceiverError;
use crate::supervisor::WorkerHandle;

#[derive(Debug, Clone, Copy)]
enum Script {
    /// Wait for cancellation, then report
    UntilCancelled,
    /// Fail through the fatal path after a delay
    FailAfter(Duration),
    /// Close the signal but never report
    SilentFailure,
    /// Ignore cancellation entirely
    NeverFinish,
    /// Panic after a delay, holding the handle
    PanicAfter(Duration),
}

/// A worker whose behaviour is fixed up front.
#[derive(Debug)]
pub struct Scripted {
    name: &'static str,
    script: Script,
    exit_delay: Duration,
}

impl Scripted {
    pub fn until_cancelled(name: &'static str) -> Self {
        Self::new(name, Script::UntilCancelled)
    }

    pub fn failing_after(name: &'static str, delay: Duration) -> Self {
        Self::new(name, Script::FailAfter(delay))
    }

    pub fn silent_failure(name: &'static str) -> Self {
        Self::new(name, Script::SilentFailure)
    }

    pub fn never_finishing(name: &'static str) -> Self {
        Self::new(name, Script::NeverFinish)
    }

    pub fn panicking_after(name: &'static str, delay: Duration) -> Self {
        Self::new(name, Script::PanicAfter(delay))
    }

    fn new(name: &'static str, script: Script) -> Self {
        Self {
            name,
            script,
            exit_delay: Duration::ZERO,
        }
    }

    /// Delay between observing cancellation and reporting
    pub fn with_exit_delay(mut self, delay: Duration) -> Self {
        self.exit_delay = delay;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn into_worker(self) -> Worker {
        Worker::Scripted(self)
    }

    pub async fn run(self, handle: WorkerHandle) {
        match self.script {
            Script::UntilCancelled => {
                handle.cancelled().await;
                tokio::time::sleep(self.exit_delay).await;
                handle.complete();
            }
            Script::FailAfter(delay) => {
                tokio::time::sleep(delay).await;
                handle.fail(ReceiverError::Discovery(format!("{} failed", self.name)));
            }
            Script::SilentFailure => {
                handle.coordinator().trigger_fatal(handle.id(), "silent failure");
                std::future::pending::<()>().await;
            }
            Script::NeverFinish => {
                std::future::pending::<()>().await;
            }
            Script::PanicAfter(delay) => {
                let _handle = handle;
                tokio::time::sleep(delay).await;
                panic!("{} panicked", self.name);
            }
        }
    }
}
