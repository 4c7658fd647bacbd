use std::time::Duration;

use crate::ContentId;

/// Watched-fraction threshold: at or above this, an episode counts as seen
/// and continuity resolution skips past it.
pub const WATCHED_FRACTION: f64 = 0.90;

/// Fraction of `duration` covered by `position`, clamped to `[0, 1]`.
///
/// A zero or unknown duration yields `0.0` so the episode stays eligible.
#[must_use]
pub fn watched_fraction(position: Duration, duration: Duration) -> f64 {
    let total = duration.as_secs_f64();
    if total <= 0.0 {
        return 0.0;
    }
    (position.as_secs_f64() / total).clamp(0.0, 1.0)
}

/// Storage key under which a content's playback position is persisted.
#[must_use]
pub fn progress_key(content: &ContentId) -> String {
    format!("video-player-time-{content}")
}
