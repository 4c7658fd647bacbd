#![forbid(unsafe_code)]

use crate::{ContinuityEvent, PlayerEvent, QualityEvent, SecurityEvent, TelemetryEvent};

/// Unified event for the full watch session.
///
/// Hierarchical: each subsystem has its own variant with a sub-enum.
#[derive(Clone, Debug)]
pub enum Event {
    /// Playback clock event.
    Player(PlayerEvent),
    /// Episode continuity event.
    Continuity(ContinuityEvent),
    /// Quality advisor event.
    Quality(QualityEvent),
    /// Security validation event.
    Security(SecurityEvent),
    /// Telemetry channel event.
    Telemetry(TelemetryEvent),
}

impl From<PlayerEvent> for Event {
    fn from(e: PlayerEvent) -> Self {
        Self::Player(e)
    }
}

impl From<ContinuityEvent> for Event {
    fn from(e: ContinuityEvent) -> Self {
        Self::Continuity(e)
    }
}

impl From<QualityEvent> for Event {
    fn from(e: QualityEvent) -> Self {
        Self::Quality(e)
    }
}

impl From<SecurityEvent> for Event {
    fn from(e: SecurityEvent) -> Self {
        Self::Security(e)
    }
}

impl From<TelemetryEvent> for Event {
    fn from(e: TelemetryEvent) -> Self {
        Self::Telemetry(e)
    }
}
