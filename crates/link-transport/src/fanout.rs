use crate::{LinkError, PacketSink};
use core::fmt;

/// Outcome of one send on one sink.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Delivery {
    Sent,
    /// Streaming sink had nobody to deliver to.
    NoClient,
    Failed(String),
}

impl Delivery {
    pub fn is_sent(&self) -> bool {
        matches!(self, Delivery::Sent)
    }
}

impl From<crate::Result<()>> for Delivery {
    fn from(r: crate::Result<()>) -> Self {
        match r {
            Ok(()) => Delivery::Sent,
            Err(LinkError::NoClient) => Delivery::NoClient,
            Err(e) => Delivery::Failed(e.to_string()),
        }
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Sent => f.write_str("sent"),
            Delivery::NoClient => f.write_str("no client"),
            Delivery::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BroadcastReport {
    pub streaming: Delivery,
    pub datagram: Delivery,
}

impl BroadcastReport {
    pub fn any_sent(&self) -> bool {
        self.streaming.is_sent() || self.datagram.is_sent()
    }
}

/// Sends each packet to a streaming sink and a datagram sink.
///
/// Both sends run concurrently and independently. Errors are logged and
/// folded into the returned report; they never propagate to the caller.
pub struct Broadcaster {
    streaming: Box<dyn PacketSink>,
    datagram: Box<dyn PacketSink>,
}

impl Broadcaster {
    pub fn new(streaming: impl PacketSink + 'static, datagram: impl PacketSink + 'static) -> Self {
        Self {
            streaming: Box::new(streaming),
            datagram: Box::new(datagram),
        }
    }

    pub async fn broadcast(&mut self, packet: &str) -> BroadcastReport {
        let (streaming, datagram) = tokio::join!(
            self.streaming.send(packet),
            self.datagram.send(packet)
        );
        let report = BroadcastReport {
            streaming: streaming.into(),
            datagram: datagram.into(),
        };
        log_delivery(self.streaming.name(), packet, &report.streaming);
        log_delivery(self.datagram.name(), packet, &report.datagram);
        if report.any_sent() {
            tracing::info!(
                %packet,
                streaming = %report.streaming,
                datagram = %report.datagram,
                "sent packet"
            );
        } else {
            tracing::warn!(
                %packet,
                streaming = %report.streaming,
                datagram = %report.datagram,
                "packet reached no sink"
            );
        }
        report
    }

    pub async fn close(&mut self) {
        self.streaming.close().await;
        self.datagram.close().await;
    }
}

fn log_delivery(sink: &str, packet: &str, delivery: &Delivery) {
    match delivery {
        Delivery::Sent => tracing::debug!(sink, %packet, "delivered"),
        Delivery::NoClient => tracing::debug!(sink, %packet, "no client connected, skipped"),
        Delivery::Failed(reason) => tracing::warn!(sink, %packet, %reason, "send failed"),
    }
}
