#![forbid(unsafe_code)]

mod bus;
mod continuity;
mod event;
mod player;
mod quality;
mod security;
mod telemetry;

pub use bus::EventBus;
pub use continuity::ContinuityEvent;
pub use event::Event;
pub use player::PlayerEvent;
pub use quality::QualityEvent;
pub use security::SecurityEvent;
pub use telemetry::TelemetryEvent;
