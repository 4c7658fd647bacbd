use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum WatchError {
    #[error(transparent)]
    Continuity(#[from] theatron_continuity::ContinuityError),

    #[error(transparent)]
    Security(#[from] theatron_security::SecurityError),

    #[error(transparent)]
    Telemetry(#[from] theatron_telemetry::TelemetryError),

    #[error(transparent)]
    Play(#[from] theatron_play::PlayError),

    #[error(transparent)]
    Storage(#[from] theatron_storage::StorageError),
}

pub type WatchResult<T> = Result<T, WatchError>;
