use crate::{LinkError, PacketSink, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// In-process sink that records every packet it accepts.
pub struct MockSink {
    name: String,
    log: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl MockSink {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            log: Arc::new(Mutex::new(Vec::new())),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared handle to the recorded packets; stays valid after the sink moves.
    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }

    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        self.closed.clone()
    }
}

#[async_trait]
impl PacketSink for MockSink {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&mut self, packet: &str) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LinkError::Closed("mock sink closed".to_string()));
        }
        self.log.lock().push(packet.to_string());
        Ok(())
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Sink that rejects every packet with a fixed error.
pub struct FailingSink {
    kind: FailureKind,
    attempts: Arc<Mutex<usize>>,
}

enum FailureKind {
    NoClient,
    Io(String),
}

impl FailingSink {
    pub fn no_client() -> Self {
        Self {
            kind: FailureKind::NoClient,
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    pub fn io(reason: &str) -> Self {
        Self {
            kind: FailureKind::Io(reason.to_string()),
            attempts: Arc::new(Mutex::new(0)),
        }
    }

    /// Number of send attempts seen so far.
    pub fn attempts(&self) -> Arc<Mutex<usize>> {
        self.attempts.clone()
    }
}

#[async_trait]
impl PacketSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    async fn send(&mut self, _packet: &str) -> Result<()> {
        *self.attempts.lock() += 1;
        match &self.kind {
            FailureKind::NoClient => Err(LinkError::NoClient),
            FailureKind::Io(reason) => Err(LinkError::Io(reason.clone())),
        }
    }
}
