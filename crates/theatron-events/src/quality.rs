#![forbid(unsafe_code)]

/// Events published by the quality advisor.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum QualityEvent {
    /// The cosmetic quality label changed. The media source is untouched.
    LevelChanged { label: &'static str },
    /// A fresh throughput estimate is available, bits per second.
    EstimateUpdated { bps: u64 },
}
