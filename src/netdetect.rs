use anyhow::{Context, Result};
use if_addrs::{get_if_addrs, IfAddr};
use ipnet::Ipv4Net;
use std::net::{IpAddr, Ipv4Addr};
use tokio::sync::mpsc;
use tracing::debug;

use crate::error::InterfaceError;

/// Look up the IPv4 addresses assigned to the interface called `name`.
///
/// Order follows the OS enumeration. Every returned address seeds its own /24 sweep.
pub fn resolve_interface_ipv4(name: &str) -> Result<Vec<Ipv4Addr>, InterfaceError> {
    let ifaces = get_if_addrs()?;
    let entries = ifaces.iter().map(|iface| {
        let ip = match &iface.addr {
            IfAddr::V4(v4) => IpAddr::V4(v4.ip),
            IfAddr::V6(v6) => IpAddr::V6(v6.ip),
        };
        (iface.name.as_str(), ip)
    });
    let addrs = select_interface_ipv4(name, entries)?;
    debug!(interface = name, ?addrs, "resolved interface addresses");
    Ok(addrs)
}

/// Pick the IPv4 addresses belonging to `name` out of `(interface, address)` pairs.
///
/// A name with no entries is `NotFound`, whether the interface is missing or simply has no
/// address (the OS enumeration skips those). A known interface carrying only IPv6 is `NoIpv4`.
pub fn select_interface_ipv4<'a, I>(name: &str, entries: I) -> Result<Vec<Ipv4Addr>, InterfaceError>
where
    I: IntoIterator<Item = (&'a str, IpAddr)>,
{
    let mut seen = false;
    let mut out = Vec::new();
    for (iface, ip) in entries {
        if iface != name {
            continue;
        }
        seen = true;
        if let IpAddr::V4(v4) = ip {
            if !out.contains(&v4) {
                out.push(v4);
            }
        }
    }
    if !seen {
        return Err(InterfaceError::NotFound { name: name.to_string() });
    }
    if out.is_empty() {
        return Err(InterfaceError::NoIpv4 { name: name.to_string() });
    }
    Ok(out)
}

/// Helper: convert an IPv4 address into its default /24 network.
pub fn ipv4_to_default_cidr(ip: Ipv4Addr) -> Ipv4Net {
    let o = ip.octets();
    let net = Ipv4Addr::new(o[0], o[1], o[2], 0);
    Ipv4Net::new(net, 24).expect("/24 is always valid")
}

/// Every neighbour of `seed` in its /24: fourth octet 1..=255, skipping `seed` itself.
///
/// The broadcast address `.255` stays in the sweep.
pub fn candidate_range(seed: Ipv4Addr) -> Vec<Ipv4Addr> {
    let base = u32::from(ipv4_to_default_cidr(seed).network());
    (1..=255u32)
        .map(|host| Ipv4Addr::from(base | host))
        .filter(|ip| *ip != seed)
        .collect()
}

/// Push the candidates for `seed` into the shared work queue, waiting for room when it is full.
///
/// Returns how many addresses were queued.
pub async fn enqueue_candidates(seed: Ipv4Addr, queue: &mpsc::Sender<Ipv4Addr>) -> Result<usize> {
    let candidates = candidate_range(seed);
    let count = candidates.len();
    for ip in candidates {
        queue
            .send(ip)
            .await
            .with_context(|| format!("candidate queue closed while expanding {seed}"))?;
    }
    debug!(%seed, count, "queued candidates");
    Ok(count)
}
