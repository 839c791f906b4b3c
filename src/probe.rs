use async_trait::async_trait;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time;
use tracing::debug;

/// UDP port ATEM switchers listen on for control sessions.
pub const ATEM_PORT: u16 = 9910;

/// Largest reply we bother reading; the contents are discarded.
pub const REPLY_BUF_LEN: usize = 64;

/// Session hello: 12-byte header (`SYN` flag, length 20, session id `0x1337`) then an 8-byte payload.
pub const PROBE_PACKET: [u8; 20] = [
    0x10, 0x14, 0x13, 0x37, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // header
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // payload
];

/// Liveness check for one candidate. Implementations must never fail: anything short of a reply is "absent".
#[async_trait]
pub trait Prober: Send + Sync + 'static {
    async fn probe(&self, addr: Ipv4Addr) -> bool;
}

/// Real prober: one UDP socket per call, one hello datagram, one bounded wait.
#[derive(Debug, Clone)]
pub struct UdpProber {
    pub port: u16,
    pub timeout: Duration,
}

impl UdpProber {
    pub fn new(port: u16, timeout: Duration) -> Self {
        Self { port, timeout }
    }
}

impl Default for UdpProber {
    fn default() -> Self {
        Self::new(ATEM_PORT, Duration::from_millis(100))
    }
}

#[async_trait]
impl Prober for UdpProber {
    async fn probe(&self, addr: Ipv4Addr) -> bool {
        ping_atem(addr, self.port, self.timeout).await
    }
}

/// Send the hello to `addr:port` and report whether any datagram comes back within `timeout`.
///
/// Reply contents are not validated; any datagram counts as a device. Socket, send and receive
/// failures are all reported as absent. The socket is dropped before returning on every path.
pub async fn ping_atem(addr: Ipv4Addr, port: u16, timeout: Duration) -> bool {
    let target = SocketAddr::from((addr, port));
    match time::timeout(timeout, exchange(target)).await {
        Ok(Ok(n)) => {
            debug!(%addr, bytes = n, "probe answered");
            true
        }
        Ok(Err(e)) => {
            debug!(%addr, error = %e, "probe failed");
            false
        }
        Err(_) => {
            debug!(%addr, "probe timed out");
            false
        }
    }
}

async fn exchange(target: SocketAddr) -> io::Result<usize> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.connect(target).await?;
    socket.send(&PROBE_PACKET).await?;
    let mut buf = [0u8; REPLY_BUF_LEN];
    socket.recv(&mut buf).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packet_layout() {
        assert_eq!(PROBE_PACKET.len(), 20);
        assert_eq!(&PROBE_PACKET[..4], &[0x10, 0x14, 0x13, 0x37]);
        assert!(PROBE_PACKET[4..12].iter().all(|b| *b == 0));
        assert_eq!(PROBE_PACKET[12], 0x01);
        assert!(PROBE_PACKET[13..].iter().all(|b| *b == 0));
        // Second byte of the header is the total packet length.
        assert_eq!(PROBE_PACKET[1] as usize, PROBE_PACKET.len());
    }

    #[test]
    fn default_prober_targets_atem_port() {
        let p = UdpProber::default();
        assert_eq!(p.port, 9910);
        assert_eq!(p.timeout, Duration::from_millis(100));
    }
}
