use crate::Result;
use async_trait::async_trait;

/// One downstream consumer of text command packets.
#[async_trait]
pub trait PacketSink: Send {
    /// Short label used in logs.
    fn name(&self) -> &str;

    /// Deliver one packet. Failures are reported, never retried.
    async fn send(&mut self, packet: &str) -> Result<()>;

    /// Stop accepting work and release sockets.
    async fn close(&mut self) {}
}
