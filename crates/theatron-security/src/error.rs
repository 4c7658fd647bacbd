use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum SecurityError {
    /// `run()` was called while a run is already in flight.
    #[error("validation run already in progress")]
    AlreadyRunning,

    #[error("validation response malformed: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Net(#[from] theatron_net::NetError),
}

pub type SecurityResult<T> = Result<T, SecurityError>;
