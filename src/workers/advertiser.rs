//! Service advertiser worker.
//!
//! Registers the receiver over mDNS on one interface, holds the registration
//! until shutdown, then withdraws it.

use tokio::task;
use tracing::{info, warn};

use crate::discovery::{resolve_interface, DiscoveryAnnouncer, InterfaceSource, ServiceRecord};
use crate::supervisor::WorkerHandle;

pub struct ServiceAdvertiser {
    service: ServiceRecord,
    interface: String,
    interfaces: Box<dyn InterfaceSource>,
    announcer: Box<dyn DiscoveryAnnouncer>,
}

impl ServiceAdvertiser {
    #[must_use]
    pub fn new(
        service: ServiceRecord,
        interface: String,
        interfaces: Box<dyn InterfaceSource>,
        announcer: Box<dyn DiscoveryAnnouncer>,
    ) -> Self {
        Self {
            service,
            interface,
            interfaces,
            announcer,
        }
    }

    pub async fn run(self, handle: WorkerHandle) {
        info!("Starting Zeroconf service");

        let iface = match resolve_interface(self.interfaces.as_ref(), &self.interface) {
            Ok(iface) => iface,
            Err(e) => return handle.fail(e),
        };

        let advertisement = match self.announcer.advertise(&self.service, &iface) {
            Ok(advertisement) => advertisement,
            Err(e) => return handle.fail(e),
        };
        info!(
            "Advertising {} on port {} via {} ({:?})",
            self.service.fullname(),
            self.service.port,
            iface.name,
            iface.addrs
        );

        handle.cancelled().await;

        // Unregistering waits on the mDNS daemon
        match task::spawn_blocking(move || advertisement.shutdown()).await {
            Ok(Ok(())) => info!("Shutdown Zeroconf service"),
            Ok(Err(e)) => warn!("Failed to withdraw advertisement: {}", e),
            Err(e) => warn!("Advertisement shutdown task failed: {}", e),
        }

        handle.complete();
    }
}
