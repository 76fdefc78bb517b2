use link_transport::LinkError;
use thiserror::Error;

pub type Result<T, E = TeleopError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum TeleopError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("input source unavailable: {0}")]
    InputUnavailable(String),
    #[error("cannot resolve {0}")]
    Resolve(String),
    #[error("I/O error: {0}")]
    Io(String),
    #[error(transparent)]
    Link(#[from] LinkError),
}

impl From<std::io::Error> for TeleopError {
    fn from(e: std::io::Error) -> Self {
        TeleopError::Io(e.to_string())
    }
}
