//! WebSocket streaming sink.
//!
//! A dedicated acceptor task listens for TCP connections and performs the
//! WebSocket handshake. At most one client is active: a newer connection
//! replaces the older one. Packets are pushed server to client only; any
//! frames the client sends are drained and ignored, and a Close frame frees
//! the slot. Packets sent while no client is connected are dropped, there is
//! no backlog.

use crate::{LinkError, PacketSink, Result};
use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

type WsWriter = SplitSink<WebSocketStream<TcpStream>, Message>;
type ClientSlot = Arc<Mutex<Option<Client>>>;

struct Client {
    id: u64,
    peer: SocketAddr,
    writer: WsWriter,
    reader: JoinHandle<()>,
}

/// Streaming sink backed by a single-client WebSocket server.
pub struct WsSink {
    local_addr: SocketAddr,
    send_timeout: Duration,
    slot: ClientSlot,
    acceptor: Option<JoinHandle<()>>,
}

impl WsSink {
    /// Bind the listener and start accepting clients in the background.
    pub async fn bind(addr: SocketAddr, send_timeout: Duration) -> Result<Self> {
        let listener = TcpListener::bind(addr).await.map_err(|e| LinkError::Bind {
            addr,
            reason: e.to_string(),
        })?;
        let local_addr = listener.local_addr()?;
        let slot: ClientSlot = Arc::new(Mutex::new(None));
        let acceptor = tokio::spawn(accept_loop(listener, slot.clone()));
        tracing::info!(%local_addr, "websocket server listening");
        Ok(Self {
            local_addr,
            send_timeout,
            slot,
            acceptor: Some(acceptor),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Address of the active client, if any.
    pub async fn client(&self) -> Option<SocketAddr> {
        self.slot.lock().await.as_ref().map(|c| c.peer)
    }

    pub fn is_accepting(&self) -> bool {
        self.acceptor.as_ref().is_some_and(|h| !h.is_finished())
    }
}

#[async_trait]
impl PacketSink for WsSink {
    fn name(&self) -> &str {
        "websocket"
    }

    async fn send(&mut self, packet: &str) -> Result<()> {
        let mut guard = self.slot.lock().await;
        let Some(client) = guard.as_mut() else {
            return Err(LinkError::NoClient);
        };
        let sent = tokio::time::timeout(
            self.send_timeout,
            client.writer.send(Message::Text(packet.to_string())),
        )
        .await;
        let err = match sent {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => LinkError::Closed(e.to_string()),
            Err(_) => LinkError::Timeout,
        };
        if let Some(stale) = guard.take() {
            tracing::warn!(peer = %stale.peer, error = %err, "dropping websocket client");
            stale.reader.abort();
        }
        Err(err)
    }

    async fn close(&mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            acceptor.abort();
        }
        if let Some(client) = self.slot.lock().await.take() {
            shutdown_client(client).await;
        }
        tracing::info!(local_addr = %self.local_addr, "websocket server stopped");
    }
}

impl Drop for WsSink {
    fn drop(&mut self) {
        if let Some(acceptor) = self.acceptor.take() {
            acceptor.abort();
        }
    }
}

async fn accept_loop(listener: TcpListener, slot: ClientSlot) {
    let next_id = Arc::new(AtomicU64::new(1));
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::warn!(error = %e, "accept failed");
                continue;
            }
        };
        let slot = slot.clone();
        let id = next_id.fetch_add(1, Ordering::Relaxed);
        // Handshake off the accept path so a slow client cannot block others.
        tokio::spawn(async move {
            match tokio::time::timeout(HANDSHAKE_TIMEOUT, tokio_tungstenite::accept_async(stream))
                .await
            {
                Ok(Ok(ws)) => install_client(ws, peer, id, slot).await,
                Ok(Err(e)) => tracing::warn!(%peer, error = %e, "websocket handshake failed"),
                Err(_) => tracing::warn!(%peer, "websocket handshake timed out"),
            }
        });
    }
}

async fn install_client(
    ws: WebSocketStream<TcpStream>,
    peer: SocketAddr,
    id: u64,
    slot: ClientSlot,
) {
    let (writer, mut reader) = ws.split();
    let reader_slot = slot.clone();
    // Held until the client is in the slot, so the reader's cleanup always sees it.
    let mut guard = slot.lock().await;
    let reader = tokio::spawn(async move {
        while let Some(msg) = reader.next().await {
            match msg {
                Ok(Message::Close(frame)) => {
                    tracing::info!(%peer, ?frame, "websocket client closed");
                    break;
                }
                Ok(other) => tracing::trace!(%peer, ?other, "ignoring client frame"),
                Err(e) => {
                    tracing::debug!(%peer, error = %e, "websocket read error");
                    break;
                }
            }
        }
        let mut guard = reader_slot.lock().await;
        if guard.as_ref().is_some_and(|c| c.id == id) {
            guard.take();
        }
    });

    let previous = guard.replace(Client {
        id,
        peer,
        writer,
        reader,
    });
    drop(guard);
    tracing::info!(%peer, "websocket client connected");
    if let Some(old) = previous {
        tracing::info!(peer = %old.peer, "replacing previous websocket client");
        shutdown_client(old).await;
    }
}

async fn shutdown_client(mut client: Client) {
    client.reader.abort();
    let _ = tokio::time::timeout(Duration::from_millis(200), client.writer.close()).await;
}
