//! # Workers Module
//!
//! The long-running tasks the [`Supervisor`](crate::supervisor::Supervisor)
//! launches. Each one watches the shared cancellation signal at its loop
//! boundary and reports through its [`WorkerHandle`] exactly once.
//!
//! | Id | Worker | Suspends on |
//! |----|--------|-------------|
//! | 0 | Heartbeat | fixed-interval sleep |
//! | 1 | Packet ingest | bounded-deadline UDP receive |
//! | 2 | Service advertiser | the cancellation signal |
//! | 3 | Cursor mover | fixed-interval sleep |

pub mod advertiser;
pub mod cursor_mover;
pub mod heartbeat;
pub mod ingest;

#[cfg(test)]
pub mod testing;

use std::sync::Arc;

use crate::codec::protobuf::ProtobufCodec;
use crate::config::Config;
use crate::control::cursor::cursor_channel;
use crate::control::mapper::ControlMapper;
use crate::discovery::mdns::MdnsAnnouncer;
use crate::discovery::{HostInterfaces, ServiceRecord};
use crate::hid::HidInjector;
use crate::supervisor::WorkerHandle;

use advertiser::ServiceAdvertiser;
use cursor_mover::CursorMover;
use heartbeat::Heartbeat;
use ingest::{Listener, PacketIngest};

/// The closed set of workers the supervisor can run.
pub enum Worker {
    Heartbeat(Heartbeat),
    PacketIngest(PacketIngest),
    ServiceAdvertiser(ServiceAdvertiser),
    CursorMover(CursorMover),
    #[cfg(test)]
    Scripted(testing::Scripted),
}

impl Worker {
    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Worker::Heartbeat(_) => "heartbeat",
            Worker::PacketIngest(_) => "packet_ingest",
            Worker::ServiceAdvertiser(_) => "service_advertiser",
            Worker::CursorMover(_) => "cursor_mover",
            #[cfg(test)]
            Worker::Scripted(worker) => worker.name(),
        }
    }

    /// Run to completion. Reporting through `handle` is the worker's job.
    pub async fn run(self, handle: WorkerHandle) {
        match self {
            Worker::Heartbeat(worker) => worker.run(handle).await,
            Worker::PacketIngest(worker) => worker.run(handle).await,
            Worker::ServiceAdvertiser(worker) => worker.run(handle).await,
            Worker::CursorMover(worker) => worker.run(handle).await,
            #[cfg(test)]
            Worker::Scripted(worker) => worker.run(handle).await,
        }
    }
}

/// Assemble the production worker set, in launch order.
///
/// The service advertiser is left out when discovery is disabled.
#[must_use]
pub fn standard_workers(config: &Config, injector: Arc<dyn HidInjector>) -> Vec<Worker> {
    let (cursor_writer, cursor_reader) = cursor_channel();

    let mut workers = vec![
        Worker::Heartbeat(Heartbeat::new(config.heartbeat.interval())),
        Worker::PacketIngest(PacketIngest::new(
            Listener::Address(config.network.listen_address()),
            config.network.max_datagram_bytes,
            config.network.receive_timeout(),
            Box::new(ProtobufCodec),
            ControlMapper::from(&config.mapper),
            cursor_writer,
            injector.clone(),
        )),
    ];

    if config.discovery.enabled {
        workers.push(Worker::ServiceAdvertiser(ServiceAdvertiser::new(
            ServiceRecord::from_config(&config.discovery, config.network.port),
            config.discovery.interface.clone(),
            Box::new(HostInterfaces),
            Box::new(MdnsAnnouncer),
        )));
    }

    workers.push(Worker::CursorMover(CursorMover::new(
        config.cursor.tick(),
        cursor_reader,
        injector,
    )));

    workers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::mocks::MockInjector;

    #[test]
    fn test_standard_worker_order() {
        let workers = standard_workers(&Config::default(), Arc::new(MockInjector::new()));
        let names: Vec<_> = workers.iter().map(Worker::name).collect();
        assert_eq!(
            names,
            vec!["heartbeat", "packet_ingest", "service_advertiser", "cursor_mover"]
        );
    }

    #[test]
    fn test_discovery_disabled_drops_advertiser() {
        let mut config = Config::default();
        config.discovery.enabled = false;

        let workers = standard_workers(&config, Arc::new(MockInjector::new()));
        let names: Vec<_> = workers.iter().map(Worker::name).collect();
        assert_eq!(names, vec!["heartbeat", "packet_ingest", "cursor_mover"]);
    }
}
