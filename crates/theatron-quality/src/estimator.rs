#[cfg(test)]
use mockall::automock;

use crate::types::{SampleSource, TransferSample};

/// Trait for throughput estimation strategies.
///
/// Lets the advisor be tested with scripted estimates.
#[cfg_attr(test, automock)]
pub trait Estimator: Send {
    /// Estimated throughput in bits per second, `None` before any usable
    /// sample arrived.
    fn estimate_bps(&self) -> Option<u64>;

    /// Feed one observed transfer.
    fn push_sample(&mut self, sample: TransferSample);

    /// Forget accumulated state (source change).
    fn reset(&mut self);
}

/// Smoothed throughput estimate over recent transfers.
///
/// Two exponentially weighted averages with different half-lives: the fast
/// one reacts to drops, the slow one rides out spikes. The reported
/// estimate is the lower of the two, so the UI never overpromises.
#[derive(Clone, Debug, Default)]
pub struct ThroughputEstimator {
    fast: Ewma,
    slow: Ewma,
}

impl ThroughputEstimator {
    const FAST_HALF_LIFE_SECS: f64 = 3.0;
    const SLOW_HALF_LIFE_SECS: f64 = 12.0;
    /// Transfers smaller than this say more about request latency than
    /// about bandwidth.
    const MIN_SAMPLE_BYTES: u64 = 24_000;
    const MIN_SAMPLE_MS: f64 = 1.0;

    #[must_use]
    pub fn new() -> Self {
        Self {
            fast: Ewma::with_half_life(Self::FAST_HALF_LIFE_SECS),
            slow: Ewma::with_half_life(Self::SLOW_HALF_LIFE_SECS),
        }
    }
}

impl Estimator for ThroughputEstimator {
    fn estimate_bps(&self) -> Option<u64> {
        let estimate = self.fast.value().min(self.slow.value());
        (estimate > 0.0).then(|| estimate.round() as u64)
    }

    fn push_sample(&mut self, sample: TransferSample) {
        if sample.source != SampleSource::Network {
            return;
        }
        if sample.bytes < Self::MIN_SAMPLE_BYTES {
            return;
        }

        let millis = (sample.duration.as_secs_f64() * 1000.0).max(Self::MIN_SAMPLE_MS);
        let bps = (sample.bytes as f64) * 8000.0 / millis;
        let weight_secs = millis / 1000.0;

        self.fast.observe(weight_secs, bps);
        self.slow.observe(weight_secs, bps);
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[derive(Clone, Debug)]
struct Ewma {
    alpha: f64,
    estimate: f64,
    total_weight: f64,
}

impl Default for Ewma {
    fn default() -> Self {
        Self::with_half_life(1.0)
    }
}

impl Ewma {
    fn with_half_life(half_life_secs: f64) -> Self {
        Self {
            alpha: f64::exp(0.5_f64.ln() / half_life_secs.max(0.001)),
            estimate: 0.0,
            total_weight: 0.0,
        }
    }

    fn observe(&mut self, weight: f64, value: f64) {
        let adjusted = self.alpha.powf(weight.max(0.0));
        self.estimate = value * (1.0 - adjusted) + adjusted * self.estimate;
        self.total_weight += weight.max(0.0);
    }

    fn value(&self) -> f64 {
        if self.total_weight <= 0.0 {
            return 0.0;
        }
        // Startup correction: early samples carry partial weight.
        let correction = 1.0 - self.alpha.powf(self.total_weight);
        self.estimate / correction.max(1e-6)
    }
}
