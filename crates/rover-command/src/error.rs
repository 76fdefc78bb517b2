use thiserror::Error;

pub type Result<T, E = PacketError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("empty packet")]
    Empty,
    #[error("unknown packet kind: {0}")]
    UnknownKind(String),
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("invalid field {index}: {value}")]
    InvalidField { index: usize, value: String },
}
