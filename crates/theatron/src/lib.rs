#![forbid(unsafe_code)]

//! # Theatron
//!
//! Facade crate for the watch-session coordinator: episode continuity
//! selects what to play, the security run gates whether it may play, the
//! playback clock owns timing state, and the telemetry channel keeps the
//! session observable (and remotely stoppable) by administrators.
//!
//! ## Quick start
//!
//! ```ignore
//! use theatron::prelude::*;
//!
//! let config = WatchConfig::new(
//!     "https://api.example.com/".parse()?,
//!     "https://api.example.com/security/validate".parse()?,
//!     "wss://live.example.com/session".parse()?,
//!     "/var/lib/theatron/progress",
//!     UserId::new("viewer-1"),
//! );
//! let deps = WatchDeps::production(&config, element)?;
//! let session = WatchSession::start(config, deps, "ep-42".into()).await?;
//! session.play_pause()?;
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod core {
    pub use theatron_core::*;
}

pub mod events {
    pub use theatron_events::*;
}

pub mod net {
    pub use theatron_net::*;
}

pub mod storage {
    pub use theatron_storage::*;
}

pub mod play {
    pub use theatron_play::*;
}

pub mod continuity {
    pub use theatron_continuity::*;
}

pub mod quality {
    pub use theatron_quality::*;
}

pub mod security {
    pub use theatron_security::*;
}

pub mod telemetry {
    pub use theatron_telemetry::*;
}

mod config;
mod error;
mod session;

pub use config::WatchConfig;
pub use error::{WatchError, WatchResult};
pub use session::{WatchDeps, WatchSession};

pub mod prelude {
    pub use crate::{
        config::WatchConfig,
        error::{WatchError, WatchResult},
        session::{WatchDeps, WatchSession},
    };
    pub use theatron_core::{ContentId, SeriesId, SessionId, UserId};
    pub use theatron_events::{Event, EventBus};
    pub use theatron_play::{ElementEvent, MediaElement, PlaybackState};
    pub use theatron_security::RunState;
    pub use theatron_telemetry::ConnectionState;
}
