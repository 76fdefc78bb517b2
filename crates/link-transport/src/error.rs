use std::net::SocketAddr;
use thiserror::Error;

pub type Result<T, E = LinkError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("no streaming client connected")]
    NoClient,
    #[error("timeout")]
    Timeout,
    #[error("connection closed: {0}")]
    Closed(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },
}

impl From<std::io::Error> for LinkError {
    fn from(e: std::io::Error) -> Self {
        LinkError::Io(e.to_string())
    }
}
