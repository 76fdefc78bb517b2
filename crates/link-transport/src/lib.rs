//! link-transport: command packet delivery to the rover and its viewers
//!
//! Two sinks with different delivery semantics sit behind one [`PacketSink`]
//! trait: a single-client WebSocket server (ordered, connection scoped) and a
//! UDP socket aimed at the rover (fire-and-forget). [`Broadcaster`] fans each
//! packet out to both and keeps a failure on one from affecting the other.
//! The default build enables `mock` sinks for tests.

mod error;
pub use error::{LinkError, Result};

mod traits;
pub use traits::PacketSink;

mod udp;
pub use udp::UdpSink;

mod ws;
pub use ws::WsSink;

mod fanout;
pub use fanout::{BroadcastReport, Broadcaster, Delivery};

#[cfg(feature = "mock")]
mod mock;

#[cfg(feature = "mock")]
pub use mock::{FailingSink, MockSink};
