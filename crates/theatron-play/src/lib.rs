#![forbid(unsafe_code)]

mod clock;
mod element;
mod error;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use clock::{PlaybackClock, PlayOptions};
pub use element::{ElementError, ElementEvent, MediaElement};
pub use error::PlayError;
pub use types::{BufferedRanges, PlaybackState, TimeRange};
