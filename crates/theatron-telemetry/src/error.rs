use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum TelemetryError {
    #[error("connect failed: {0}")]
    Connect(String),

    #[error("channel is not connected")]
    NotConnected,

    #[error("wire frame malformed: {0}")]
    Malformed(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
