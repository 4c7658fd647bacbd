use thiserror::Error;

#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum StorageError {
    #[error("io failure: {0}")]
    Io(String),

    #[error("stored value is not a position: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
