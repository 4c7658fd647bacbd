use parking_lot::Mutex;
use theatron_events::{EventBus, QualityEvent};
use tracing::debug;

use crate::{
    estimator::Estimator,
    types::{QualityLevel, QualityOptions, TransferSample},
};

/// Cosmetic quality selection plus a network speed readout.
///
/// Single-rendition source model: `select()` changes the label the UI
/// shows and nothing else. The advisor never errors toward its callers —
/// a dry estimator degrades to the configured fallback estimate.
pub struct QualityAdvisor<E: Estimator> {
    opts: QualityOptions,
    bus: EventBus,
    inner: Mutex<Inner<E>>,
}

struct Inner<E> {
    selected: QualityLevel,
    estimator: E,
}

impl<E: Estimator> QualityAdvisor<E> {
    pub fn new(estimator: E, opts: QualityOptions, bus: EventBus) -> Self {
        Self {
            opts,
            bus,
            inner: Mutex::new(Inner {
                selected: QualityLevel::default(),
                estimator,
            }),
        }
    }

    /// Currently selected label.
    #[must_use]
    pub fn selected(&self) -> QualityLevel {
        self.inner.lock().selected
    }

    /// Switch the displayed quality label. Explicitly a no-op on the
    /// actual media source.
    pub fn select(&self, level: QualityLevel) {
        let changed = {
            let mut inner = self.inner.lock();
            let changed = inner.selected != level;
            inner.selected = level;
            changed
        };
        if changed {
            debug!(label = level.label(), "quality label switched");
            self.bus.publish(QualityEvent::LevelChanged {
                label: level.label(),
            });
        }
    }

    /// Feed one observed transfer into the estimator.
    pub fn push_sample(&self, sample: TransferSample) {
        let estimate = {
            let mut inner = self.inner.lock();
            inner.estimator.push_sample(sample);
            inner.estimator.estimate_bps()
        };
        if let Some(bps) = estimate {
            self.bus.publish(QualityEvent::EstimateUpdated { bps });
        }
    }

    /// Best-effort bandwidth estimate, bits per second. Falls back to the
    /// configured constant when no usable samples exist.
    #[must_use]
    pub fn estimate_bps(&self) -> u64 {
        self.inner
            .lock()
            .estimator
            .estimate_bps()
            .unwrap_or(self.opts.fallback_bps)
    }

    /// Forget sampling history (source change).
    pub fn reset(&self) {
        self.inner.lock().estimator.reset();
    }
}
