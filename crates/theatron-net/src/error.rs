use thiserror::Error;

/// Centralized error type for theatron-net.
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum NetError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },

    #[error("response body was not valid JSON: {0}")]
    InvalidBody(String),

    #[error("timeout")]
    Timeout,

    #[error("request failed after {max_attempts} attempts: {source}")]
    RetryExhausted {
        max_attempts: u32,
        source: Box<NetError>,
    },
}

impl NetError {
    /// Creates an HTTP status error.
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Checks whether this error is worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            NetError::Timeout => true,
            NetError::HttpStatus { status, .. } => {
                // 5xx server errors plus 408/429.
                *status >= 500 || *status == 429 || *status == 408
            }
            NetError::Request(msg) => {
                msg.contains("timeout") || msg.contains("connection") || msg.contains("network")
            }
            NetError::InvalidBody(_) | NetError::RetryExhausted { .. } => false,
        }
    }

    /// Gets the HTTP status code if this is a status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for NetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            return Self::Timeout;
        }
        Self::Request(error.to_string())
    }
}

pub type NetResult<T> = Result<T, NetError>;
