use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct TimeRange {
    pub start: Duration,
    pub end: Duration,
}

impl TimeRange {
    #[must_use]
    pub fn new(start: Duration, end: Duration) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub fn contains(&self, time: Duration) -> bool {
        time >= self.start && time < self.end
    }
}

/// Buffered intervals of the attached source.
///
/// Invariant: ranges are sorted by start, non-overlapping, and each has
/// `start <= end`. Raw element reports are normalized on construction, so
/// the invariant holds after every update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BufferedRanges(Vec<TimeRange>);

impl BufferedRanges {
    #[must_use]
    pub fn new(raw: impl IntoIterator<Item = TimeRange>) -> Self {
        let mut ranges: Vec<TimeRange> = raw.into_iter().filter(|r| r.start <= r.end).collect();
        ranges.sort_by_key(|r| r.start);

        let mut merged: Vec<TimeRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if range.start <= last.end => {
                    last.end = last.end.max(range.end);
                }
                _ => merged.push(range),
            }
        }
        Self(merged)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[TimeRange] {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total buffered time across all ranges.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.0.iter().map(TimeRange::duration).sum()
    }

    /// Whether `time` falls inside a buffered range.
    #[must_use]
    pub fn contains(&self, time: Duration) -> bool {
        self.0.iter().any(|r| r.contains(time))
    }
}

/// Snapshot of the playback clock, cheap to clone for the UI.
#[derive(Clone, Debug, Default)]
#[non_exhaustive]
pub struct PlaybackState {
    pub position: Duration,
    pub duration: Option<Duration>,
    pub buffered: BufferedRanges,
    pub is_playing: bool,
    pub is_buffering: bool,
    pub is_seeking: bool,
    pub is_loading: bool,
}
