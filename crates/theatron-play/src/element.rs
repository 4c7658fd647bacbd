use std::time::Duration;

use url::Url;

use crate::types::TimeRange;

#[derive(Clone, Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ElementError {
    /// The platform refused to start playback without a user gesture.
    #[error("autoplay blocked by policy")]
    AutoplayBlocked,

    #[error("media element failure: {0}")]
    Failed(String),
}

/// Notifications from the underlying media element.
///
/// The embedding layer bridges native player callbacks into
/// [`PlaybackClock::handle_event`](crate::PlaybackClock::handle_event).
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum ElementEvent {
    /// Metadata parsed; duration is now known.
    MetadataLoaded { duration: Duration },
    /// Periodic position report while the media advances.
    TimeUpdate { position: Duration },
    /// The set of buffered intervals changed.
    BufferedChanged { ranges: Vec<TimeRange> },
    /// The element stalled waiting for data.
    Waiting,
    /// Playback is progressing again.
    Playing,
    /// Enough data to play without stalling.
    CanPlay,
    /// A previously requested seek landed.
    Seeked,
    /// Playback reached the end of the source.
    Ended,
    /// Unrecoverable element error.
    Error { message: String },
}

/// Command surface of the native media element.
///
/// Implementations wrap whatever the platform provides; the clock only
/// issues commands here and receives state back through [`ElementEvent`].
#[cfg_attr(
    any(test, feature = "test-utils"),
    unimock::unimock(api = MediaElementMock)
)]
pub trait MediaElement: Send + Sync {
    /// Bind a new source. Implicitly discards the previous one.
    fn load(&self, url: &Url);

    /// Begin playback. Autoplay-policy refusals come back as
    /// [`ElementError::AutoplayBlocked`].
    fn play(&self) -> Result<(), ElementError>;

    fn pause(&self);

    /// Ask the element to seek. Completion is signalled by
    /// [`ElementEvent::Seeked`].
    fn request_seek(&self, position: Duration);
}
