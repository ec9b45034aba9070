//! Local network address used to tag entries and name files.

use std::net::Ipv4Addr;
use std::sync::OnceLock;

/// Returned when no interface carries a matching IPv4 address.
pub const UNKNOWN_ADDRESS: &str = "unknown_ip";

/// First matching IPv4 address of this host, or `unknown_ip`.
///
/// Discovered once per process.
pub fn local_address() -> &'static str {
    static ADDRESS: OnceLock<String> = OnceLock::new();
    ADDRESS.get_or_init(|| {
        first_tagged(interface_addresses())
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN_ADDRESS.to_string())
    })
}

/// IPv4 addresses of every interface, in the order the OS reports them.
#[cfg(unix)]
fn interface_addresses() -> Vec<Ipv4Addr> {
    use std::net::SocketAddrV4;

    let addrs = match nix::ifaddrs::getifaddrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to list interface addresses");
            return Vec::new();
        }
    };
    addrs
        .filter_map(|ifaddr| {
            let sin = ifaddr.address?.as_sockaddr_in().copied()?;
            Some(*SocketAddrV4::from(sin).ip())
        })
        .collect()
}

/// Source address the routing table picks for an outbound packet.
#[cfg(not(unix))]
fn interface_addresses() -> Vec<Ipv4Addr> {
    use std::net::{IpAddr, UdpSocket};

    // Connecting a UDP socket only consults the routing table; nothing is sent.
    let route = || -> Option<Ipv4Addr> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
        socket.connect((Ipv4Addr::new(10, 255, 255, 255), 1)).ok()?;
        match socket.local_addr().ok()?.ip() {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        }
    };
    route().into_iter().collect()
}

fn first_tagged(addrs: impl IntoIterator<Item = Ipv4Addr>) -> Option<Ipv4Addr> {
    addrs.into_iter().find(|ip| is_tagged(*ip))
}

/// Leading octet 10, 172 or 192, loopback excluded.
fn is_tagged(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && matches!(ip.octets()[0], 10 | 172 | 192)
}
