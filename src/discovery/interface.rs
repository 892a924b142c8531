//! Network interface lookup by name.

use std::net::IpAddr;

use crate::error::{ReceiverError, Result};

/// A host interface and every address assigned to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub addrs: Vec<IpAddr>,
}

/// Source of `(interface name, address)` pairs.
pub trait InterfaceSource: Send + Sync {
    fn addresses(&self) -> Result<Vec<(String, IpAddr)>>;
}

/// The interfaces of this host, as reported by the OS.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostInterfaces;

impl InterfaceSource for HostInterfaces {
    fn addresses(&self) -> Result<Vec<(String, IpAddr)>> {
        let ifaces = if_addrs::get_if_addrs()?;
        Ok(ifaces
            .into_iter()
            .map(|iface| {
                let ip = iface.ip();
                (iface.name, ip)
            })
            .collect())
    }
}

/// Find the interface called `name`.
///
/// # Errors
///
/// Returns `InterfaceNotFound` if no address belongs to an interface with
/// that name, or `Io` if the interface list cannot be read.
///
/// # Examples
///
/// ```no_run
/// use nunchuk_receiver::discovery::{resolve_interface, HostInterfaces};
///
/// let iface = resolve_interface(&HostInterfaces, "lo")?;
/// assert!(!iface.addrs.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn resolve_interface(source: &dyn InterfaceSource, name: &str) -> Result<NetworkInterface> {
    let addrs: Vec<IpAddr> = source
        .addresses()?
        .into_iter()
        .filter(|(iface, _)| iface == name)
        .map(|(_, addr)| addr)
        .collect();

    if addrs.is_empty() {
        return Err(ReceiverError::InterfaceNotFound(name.to_string()));
    }

    Ok(NetworkInterface {
        name: name.to_string(),
        addrs,
    })
}
