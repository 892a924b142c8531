//! # Discovery Module
//!
//! Advertises the receiver on the local network so senders can find it.
//!
//! This module handles:
//! - Resolving the configured network interface by name
//! - The [`DiscoveryAnnouncer`] seam used by the service advertiser worker
//! - mDNS / DNS-SD registration ([`mdns::MdnsAnnouncer`])

pub mod interface;
pub mod mdns;

use crate::config::DiscoveryConfig;
use crate::error::Result;
pub use interface::{resolve_interface, HostInterfaces, InterfaceSource, NetworkInterface};

/// What to advertise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRecord {
    /// Instance name, e.g. `EventSender_Zeroconf`
    pub name: String,
    /// Service type, e.g. `_protobuf._udp`
    pub service_type: String,
    /// Domain with trailing dot, e.g. `local.`
    pub domain: String,
    /// Port the packet listener is bound to
    pub port: u16,
}

impl ServiceRecord {
    #[must_use]
    pub fn from_config(config: &DiscoveryConfig, port: u16) -> Self {
        Self {
            name: config.service_name.clone(),
            service_type: config.service_type.clone(),
            domain: config.domain.clone(),
            port,
        }
    }

    /// Service type qualified with the domain.
    ///
    /// # Examples
    ///
    /// ```
    /// use nunchuk_receiver::discovery::ServiceRecord;
    ///
    /// let service = ServiceRecord {
    ///     name: "EventSender_Zeroconf".into(),
    ///     service_type: "_protobuf._udp".into(),
    ///     domain: "local.".into(),
    ///     port: 8888,
    /// };
    /// assert_eq!(service.type_domain(), "_protobuf._udp.local.");
    /// assert_eq!(service.fullname(), "EventSender_Zeroconf._protobuf._udp.local.");
    /// ```
    #[must_use]
    pub fn type_domain(&self) -> String {
        format!("{}.{}", self.service_type, self.domain)
    }

    /// Fully qualified instance name.
    #[must_use]
    pub fn fullname(&self) -> String {
        format!("{}.{}", self.name, self.type_domain())
    }
}

/// Presence advertisement backend.
pub trait DiscoveryAnnouncer: Send + Sync {
    /// Start advertising `service` on `iface` only.
    ///
    /// # Errors
    ///
    /// Returns `Discovery` error if registration fails.
    fn advertise(
        &self,
        service: &ServiceRecord,
        iface: &NetworkInterface,
    ) -> Result<Box<dyn Advertisement>>;
}

/// A live advertisement. Dropping it without `shutdown` leaves cleanup to
/// the backend.
pub trait Advertisement: Send {
    /// Withdraw the advertisement.
    fn shutdown(self: Box<Self>) -> Result<()>;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_config() {
        let service = ServiceRecord::from_config(&DiscoveryConfig::default(), 8888);
        assert_eq!(service.fullname(), "EventSender_Zeroconf._protobuf._udp.local.");
        assert_eq!(service.port, 8888);
    }
}
