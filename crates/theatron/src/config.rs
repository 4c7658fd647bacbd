use std::path::PathBuf;

use theatron_core::{ContentId, UserId};
use theatron_net::NetOptions;
use theatron_play::PlayOptions;
use theatron_quality::QualityOptions;
use theatron_security::SecurityOptions;
use theatron_telemetry::TelemetryOptions;
use url::Url;

/// Unified configuration for one [`WatchSession`](crate::WatchSession).
///
/// Aggregates the per-subsystem option structs; the defaults carry the
/// documented production policies (800 ms buffering debounce, 3 s
/// persistence, 5 × 1 s telemetry reconnect budget).
#[derive(Clone, Debug)]
pub struct WatchConfig {
    /// REST base for `GET /content/:id`.
    pub api_base: Url,
    /// Security validation endpoint.
    pub validation_endpoint: Url,
    /// Directory for persisted playback positions.
    pub progress_dir: PathBuf,
    /// Viewer owning this session.
    pub user_id: UserId,
    /// Episode preselected through the `ep=` URL parameter, if any.
    pub url_episode: Option<ContentId>,

    pub net: NetOptions,
    pub play: PlayOptions,
    pub quality: QualityOptions,
    pub security: SecurityOptions,
    pub telemetry: TelemetryOptions,
}

impl WatchConfig {
    pub fn new(
        api_base: Url,
        validation_endpoint: Url,
        telemetry_endpoint: Url,
        progress_dir: impl Into<PathBuf>,
        user_id: UserId,
    ) -> Self {
        Self {
            api_base,
            validation_endpoint,
            progress_dir: progress_dir.into(),
            user_id,
            url_episode: None,
            net: NetOptions::default(),
            play: PlayOptions::default(),
            quality: QualityOptions::default(),
            security: SecurityOptions::default(),
            telemetry: TelemetryOptions::new(telemetry_endpoint),
        }
    }

    /// Preselect an episode, as carried by the shareable `ep=` parameter.
    #[must_use]
    pub fn with_url_episode(mut self, episode: ContentId) -> Self {
        self.url_episode = Some(episode);
        self
    }
}
