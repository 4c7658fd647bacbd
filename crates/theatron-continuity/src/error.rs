use theatron_core::ContentId;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContinuityError {
    #[error("series has no episodes")]
    EmptySeries,

    #[error("episode not in series: {0}")]
    UnknownEpisode(ContentId),

    #[error("content metadata malformed: {0}")]
    Malformed(String),

    #[error(transparent)]
    Net(#[from] theatron_net::NetError),
}

pub type ContinuityResult<T> = Result<T, ContinuityError>;
