use crate::{LinkError, PacketSink, Result};
use async_trait::async_trait;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use tokio::net::UdpSocket;

/// Fire-and-forget datagram sink to a fixed destination.
///
/// The socket is bound once and reused for every packet. Nothing is read
/// back; an unreachable destination is only visible as a send error, if at
/// all.
pub struct UdpSink {
    socket: UdpSocket,
    destination: SocketAddr,
}

impl UdpSink {
    /// Bind an ephemeral local port matching the destination's address family.
    pub async fn open(destination: SocketAddr) -> Result<Self> {
        let local: SocketAddr = if destination.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        Self::open_with(local, destination).await
    }

    pub async fn open_with(local: SocketAddr, destination: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| LinkError::Bind {
                addr: local,
                reason: e.to_string(),
            })?;
        tracing::debug!(%destination, local = ?socket.local_addr().ok(), "udp sink ready");
        Ok(Self {
            socket,
            destination,
        })
    }

    pub fn destination(&self) -> SocketAddr {
        self.destination
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

#[async_trait]
impl PacketSink for UdpSink {
    fn name(&self) -> &str {
        "udp"
    }

    async fn send(&mut self, packet: &str) -> Result<()> {
        let n = self
            .socket
            .send_to(packet.as_bytes(), self.destination)
            .await?;
        if n != packet.len() {
            return Err(LinkError::Io(format!(
                "short datagram: {n} of {} bytes",
                packet.len()
            )));
        }
        Ok(())
    }
}
