//! # mDNS Announcer
//!
//! Registers the receiver as a DNS-SD service over multicast DNS, compatible
//! with Avahi and Bonjour browsers.

use mdns_sd::{IfKind, ServiceDaemon, ServiceInfo};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{Advertisement, DiscoveryAnnouncer, NetworkInterface, ServiceRecord};
use crate::error::{ReceiverError, Result};

/// How long to wait for the goodbye packets before stopping the daemon.
const UNREGISTER_TIMEOUT: Duration = Duration::from_secs(1);

/// Advertises through an `mdns-sd` daemon bound to a single interface
#[derive(Debug, Clone, Copy, Default)]
pub struct MdnsAnnouncer;

/// Label used when the machine's host name is unusable.
const FALLBACK_HOST_LABEL: &str = "nunchuk-receiver";

/// mDNS host name for a machine host name: the first label, lowercased, with
/// anything outside `[a-z0-9-]` replaced by `-`.
fn host_name(machine: &str) -> String {
    let label: String = machine
        .split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| {
            let c = c.to_ascii_lowercase();
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '-'
            }
        })
        .collect();

    if label.is_empty() {
        format!("{}.local.", FALLBACK_HOST_LABEL)
    } else {
        format!("{}.local.", label)
    }
}

/// mDNS host name of this machine.
fn local_host_name() -> String {
    match hostname::get() {
        Ok(name) => host_name(&name.to_string_lossy()),
        Err(e) => {
            warn!("Failed to read host name: {}", e);
            host_name("")
        }
    }
}

impl DiscoveryAnnouncer for MdnsAnnouncer {
    fn advertise(
        &self,
        service: &ServiceRecord,
        iface: &NetworkInterface,
    ) -> Result<Box<dyn Advertisement>> {
        let daemon = ServiceDaemon::new()?;
        daemon.disable_interface(IfKind::All)?;
        daemon.enable_interface(IfKind::Name(iface.name.clone()))?;

        let ip_list = iface
            .addrs
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let info = ServiceInfo::new(
            &service.type_domain(),
            &service.name,
            &local_host_name(),
            ip_list.as_str(),
            service.port,
            HashMap::<String, String>::new(),
        )?;
        let fullname = info.get_fullname().to_string();

        daemon.register(info)?;
        info!("Registered mDNS service {} on {} (port {})", fullname, iface.name, service.port);

        Ok(Box::new(MdnsAdvertisement { daemon, fullname }))
    }
}

struct MdnsAdvertisement {
    daemon: ServiceDaemon,
    fullname: String,
}

impl Advertisement for MdnsAdvertisement {
    fn shutdown(self: Box<Self>) -> Result<()> {
        match self.daemon.unregister(&self.fullname) {
            Ok(status) => match status.recv_timeout(UNREGISTER_TIMEOUT) {
                Ok(status) => debug!("Unregistered {}: {:?}", self.fullname, status),
                Err(e) => warn!("No unregister confirmation for {}: {}", self.fullname, e),
            },
            Err(e) => warn!("Failed to unregister {}: {}", self.fullname, e),
        }

        self.daemon
            .shutdown()
            .map(|_| ())
            .map_err(|e| ReceiverError::Discovery(format!("Failed to stop mDNS daemon: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    #[test]
    fn test_host_name_from_machine_name() {
        assert_eq!(host_name("workstation"), "workstation.local.");
        assert_eq!(host_name("Desk_PC"), "desk-pc.local.");
        assert_eq!(host_name("desk 2"), "desk-2.local.");
    }

    #[test]
    fn test_host_name_drops_domain() {
        assert_eq!(host_name("media-box.example.com"), "media-box.local.");
    }

    #[test]
    fn test_empty_host_name_falls_back() {
        assert_eq!(host_name(""), "nunchuk-receiver.local.");
        assert_eq!(host_name(".lan"), "nunchuk-receiver.local.");
    }

    #[test]
    fn test_local_host_name_is_usable() {
        let name = local_host_name();
        assert!(name.ends_with(".local."));
        assert!(name.len() > ".local.".len());
    }

    // Integration test - needs multicast on the loopback interface
    #[test]
    #[ignore] // Run with: cargo test -- --ignored
    fn test_advertise_on_loopback() {
        let service = ServiceRecord {
            name: "NunchukTest".to_string(),
            service_type: "_protobuf._udp".to_string(),
            domain: "local.".to_string(),
            port: 18888,
        };
        let iface = NetworkInterface {
            name: "lo".to_string(),
            addrs: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
        };

        let advertisement = MdnsAnnouncer.advertise(&service, &iface).expect("register failed");
        advertisement.shutdown().expect("shutdown failed");
    }
}
