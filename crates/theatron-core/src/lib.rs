#![forbid(unsafe_code)]

mod ids;
mod progress;

pub use ids::{ContentId, SeriesId, SessionId, UserId};
pub use progress::{progress_key, watched_fraction, WATCHED_FRACTION};
