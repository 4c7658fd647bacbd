use std::time::Duration;

use theatron_core::{ContentId, SeriesId};
use url::Url;

/// One episode of a series, ordered by `ordinal`.
#[derive(Clone, Debug, PartialEq)]
pub struct EpisodeRef {
    pub id: ContentId,
    pub series_id: SeriesId,
    pub ordinal: u32,
    pub duration: Duration,
    /// Single-rendition media source for this episode.
    pub media_url: Url,
}

impl EpisodeRef {
    pub fn new(
        id: impl Into<ContentId>,
        series_id: impl Into<SeriesId>,
        ordinal: u32,
        duration: Duration,
        media_url: Url,
    ) -> Self {
        Self {
            id: id.into(),
            series_id: series_id.into(),
            ordinal,
            duration,
            media_url,
        }
    }
}
