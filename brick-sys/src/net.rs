// SPDX-License-Identifier: GPL-3.0-only

//! Local address detection for brick hosts.

use std::io;
use std::net::{IpAddr, SocketAddrV4, SocketAddrV6, ToSocketAddrs};

use nix::ifaddrs::getifaddrs;

/// Addresses assigned to the local network interfaces.
pub fn local_addresses() -> io::Result<Vec<IpAddr>> {
    let addresses = getifaddrs()?
        .filter_map(|interface| interface.address)
        .filter_map(|address| {
            if let Some(sin) = address.as_sockaddr_in() {
                Some(IpAddr::V4(*SocketAddrV4::from(*sin).ip()))
            } else {
                address
                    .as_sockaddr_in6()
                    .map(|sin6| IpAddr::V6(*SocketAddrV6::from(*sin6).ip()))
            }
        })
        .collect();
    Ok(addresses)
}

/// Whether any address in `candidates` is one of `local`.
pub fn any_local(local: &[IpAddr], candidates: impl IntoIterator<Item = IpAddr>) -> bool {
    candidates.into_iter().any(|candidate| local.contains(&candidate))
}

/// Resolve `host` and report whether it names this machine.
pub fn is_local_address(host: &str) -> io::Result<bool> {
    let local = local_addresses()?;
    let resolved = (host, 0).to_socket_addrs()?;
    Ok(any_local(&local, resolved.map(|addr| addr.ip())))
}
