#![forbid(unsafe_code)]

use std::time::Duration;

/// Events published by the playback clock.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum PlayerEvent {
    /// A new media source was attached.
    SourceAttached,
    /// Play/pause state flipped.
    PlayingChanged { playing: bool },
    /// The browser/platform refused to start playback without a user
    /// gesture. Not an error; the UI shows a play affordance.
    AutoplayBlocked,
    /// Buffering state settled after the debounce window.
    BufferingChanged { buffering: bool },
    /// A seek was requested and is in flight.
    SeekStarted { target: Duration },
    /// The underlying element confirmed the seek.
    SeekCompleted { position: Duration },
    /// Duration became known (metadata loaded).
    DurationChanged { duration: Duration },
    /// The saved position was restored after metadata load.
    PositionRestored { position: Duration },
    /// Playback reached the end of the content.
    DidPlayToEnd,
    /// The element reported an unrecoverable error; the clock degraded to
    /// the "no playable video" state.
    PlaybackFailed { message: String },
}
