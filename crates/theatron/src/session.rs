use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use theatron_continuity::{EpisodeRef, EpisodeSelector, MetadataClient, Selection, SeriesIndex};
use theatron_core::{ContentId, SessionId};
use theatron_events::{Event, EventBus, TelemetryEvent};
use theatron_net::Net;
use theatron_play::{ElementEvent, MediaElement, PlaybackClock, PlaybackState};
use theatron_quality::{QualityAdvisor, QualityLevel, ThroughputEstimator, TransferSample};
use theatron_security::{CheckRunner, RunContext, RunState, SecuritySession};
use theatron_storage::ProgressStore;
use theatron_telemetry::{ConnectionState, TelemetryChannel, Transport};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{config::WatchConfig, error::WatchResult};

/// Injected collaborators. Production wires the reqwest client, the
/// platform media element, the file progress store and the WebSocket
/// transport; tests swap any seam for a scripted fake.
pub struct WatchDeps<R: CheckRunner> {
    pub element: Arc<dyn MediaElement>,
    pub store: Arc<dyn ProgressStore>,
    pub net: Arc<dyn Net>,
    pub transport: Arc<dyn Transport>,
    pub runner: R,
}

impl WatchDeps<theatron_security::HttpCheckRunner> {
    /// Production wiring: retrying HTTP client, crash-safe file store and
    /// the tokio-tungstenite transport. Only the media element is
    /// platform-specific and stays injected.
    pub fn production(
        config: &WatchConfig,
        element: Arc<dyn MediaElement>,
    ) -> WatchResult<Self> {
        use theatron_net::{HttpClient, NetExt};

        let net: Arc<dyn Net> = Arc::new(
            HttpClient::new(config.net.clone()).with_retry(config.net.retry_policy.clone()),
        );
        let runner = theatron_security::HttpCheckRunner::new(
            Arc::clone(&net),
            config.validation_endpoint.clone(),
        );
        let store = Arc::new(theatron_storage::FileProgressStore::new(
            config.progress_dir.clone(),
        )?);
        let transport = Arc::new(theatron_telemetry::WsTransport::new());

        Ok(Self {
            element,
            store,
            net,
            transport,
            runner,
        })
    }
}

/// One viewer's watch session, from start to teardown.
///
/// Owns every component and their background tasks; dropping or
/// [`stop`](Self::stop)ping the session cancels them all. A forced
/// disconnect from an administrator and a blocked security outcome are
/// the two hard stops: playback halts unconditionally.
pub struct WatchSession<R: CheckRunner> {
    session_id: SessionId,
    config: WatchConfig,
    bus: EventBus,
    clock: Arc<PlaybackClock>,
    selector: Mutex<EpisodeSelector>,
    advisor: QualityAdvisor<ThroughputEstimator>,
    security: tokio::sync::Mutex<SecuritySession<R>>,
    security_outcome: Mutex<RunState>,
    telemetry: Arc<TelemetryChannel>,
    store: Arc<dyn ProgressStore>,
    cancel: CancellationToken,
}

impl<R: CheckRunner> WatchSession<R> {
    /// Resolve the episode, gate it through security, attach playback and
    /// bring the telemetry channel up.
    pub async fn start(
        config: WatchConfig,
        deps: WatchDeps<R>,
        content: ContentId,
    ) -> WatchResult<Self> {
        let session_id = SessionId::new();
        let bus = EventBus::new(128);
        let cancel = CancellationToken::new();

        // 1) Continuity: fetch metadata, build the series index, resolve
        //    the starting episode.
        let metadata = MetadataClient::new(Arc::clone(&deps.net), config.api_base.clone());
        let meta = metadata.fetch_content(&content).await?;
        let index = SeriesIndex::new(meta.episode_refs()?)?;
        let initial = index.resolve_initial(config.url_episode.as_ref(), deps.store.as_ref());
        let selector = EpisodeSelector::new(index, initial, bus.clone());

        // 2) Security gate. Runs before any media is touched.
        let mut security =
            SecuritySession::new(deps.runner, config.security.clone(), bus.clone());
        let ctx = RunContext {
            session_id,
            user_id: config.user_id.clone(),
            content_id: selector.current().id.clone(),
        };
        let outcome = security.run(&ctx).await?;
        info!(?outcome, %session_id, "security run finished");

        // 3) Playback clock plus its ticker.
        let clock = Arc::new(PlaybackClock::new(
            Arc::clone(&deps.element),
            Arc::clone(&deps.store),
            bus.clone(),
            config.play.clone(),
        ));
        let _ticker = clock.spawn_ticker(cancel.child_token());

        // 4) Telemetry channel.
        let telemetry = Arc::new(TelemetryChannel::new(
            Arc::clone(&deps.transport),
            config.telemetry.clone(),
            session_id,
            config.user_id.clone(),
            bus.clone(),
        ));
        telemetry.connect()?;

        let advisor = QualityAdvisor::new(
            ThroughputEstimator::new(),
            config.quality.clone(),
            bus.clone(),
        );

        let session = Self {
            session_id,
            config,
            bus,
            clock,
            selector: Mutex::new(selector),
            advisor,
            security: tokio::sync::Mutex::new(security),
            security_outcome: Mutex::new(outcome),
            telemetry,
            store: deps.store,
            cancel,
        };

        // 5) Attach unless blocked. A failed outcome attaches paused with
        //    the warning already on the bus.
        if outcome.allows_playback() {
            let episode = session.selector.lock().current().clone();
            session.attach_episode(&episode);
        } else {
            warn!(%session_id, "playback blocked by security outcome");
        }

        session.spawn_propagation();
        Ok(session)
    }

    #[must_use]
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Subscribe to everything the session publishes.
    #[must_use]
    pub fn events(&self) -> tokio::sync::broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    #[must_use]
    pub fn playback(&self) -> PlaybackState {
        self.clock.state()
    }

    /// Bridge for the embedding layer: forward a native media element
    /// callback into the clock.
    pub fn handle_element_event(&self, event: ElementEvent) {
        self.clock.handle_event(event, std::time::Instant::now());
    }

    #[must_use]
    pub fn security_outcome(&self) -> RunState {
        *self.security_outcome.lock()
    }

    /// Copy of the audit trail of the most recent validation run.
    pub async fn audit_entries(&self) -> Vec<theatron_security::AuditEntry> {
        self.security.lock().await.audit_log().entries().to_vec()
    }

    #[must_use]
    pub fn telemetry_state(&self) -> ConnectionState {
        self.telemetry.state()
    }

    /// Toggle play/pause. Refused while the security outcome forbids
    /// playback.
    pub fn play_pause(&self) -> WatchResult<()> {
        if !self.security_outcome().allows_playback() {
            warn!("play refused: session is blocked");
            return Ok(());
        }
        self.clock.toggle_play()?;
        Ok(())
    }

    pub fn seek(&self, target: std::time::Duration) -> WatchResult<std::time::Duration> {
        Ok(self.clock.seek(target)?)
    }

    pub fn skip(&self, delta_secs: f64) -> WatchResult<std::time::Duration> {
        Ok(self.clock.skip(delta_secs)?)
    }

    /// Move to the next episode, if any. Selection updates the `ep=`
    /// parameter; attaching starts from that episode's saved position.
    pub fn next_episode(&self) -> Option<EpisodeRef> {
        let episode = {
            let mut selector = self.selector.lock();
            selector.select_next().cloned()
        };
        if let Some(ref episode) = episode {
            self.attach_episode(episode);
        }
        episode
    }

    /// Move to the previous episode, if any.
    pub fn previous_episode(&self) -> Option<EpisodeRef> {
        let episode = {
            let mut selector = self.selector.lock();
            selector.select_previous().cloned()
        };
        if let Some(ref episode) = episode {
            self.attach_episode(episode);
        }
        episode
    }

    /// Activate a specific episode (deep link, episode picker).
    /// Re-selecting the current one never resets playback.
    pub fn select_episode(&self, id: &ContentId) -> WatchResult<()> {
        let (selection, episode) = {
            let mut selector = self.selector.lock();
            let selection = selector.select(id)?;
            (selection, selector.current().clone())
        };
        if selection == Selection::Changed {
            self.attach_episode(&episode);
        }
        Ok(())
    }

    /// Current value of the shareable `ep=` parameter.
    #[must_use]
    pub fn url_param(&self) -> String {
        self.selector.lock().url_param()
    }

    /// Cosmetic quality selection; never touches the media source.
    pub fn select_quality(&self, level: QualityLevel) {
        self.advisor.select(level);
    }

    #[must_use]
    pub fn bandwidth_estimate_bps(&self) -> u64 {
        self.advisor.estimate_bps()
    }

    /// Feed an observed media transfer into the bandwidth estimator.
    pub fn record_transfer(&self, sample: TransferSample) {
        self.advisor.push_sample(sample);
    }

    /// Re-run the validation sequence (periodic revalidation). A blocked
    /// outcome stops playback immediately.
    pub async fn revalidate(&self) -> WatchResult<RunState> {
        let ctx = RunContext {
            session_id: self.session_id,
            user_id: self.config.user_id.clone(),
            content_id: self.selector.lock().current().id.clone(),
        };
        let outcome = {
            let mut security = self.security.lock().await;
            security.run(&ctx).await?
        };
        *self.security_outcome.lock() = outcome;
        if !outcome.allows_playback() {
            self.clock.stop();
        }
        Ok(outcome)
    }

    /// Clean teardown: courtesy telemetry notice, playback stop, all
    /// background tasks cancelled.
    pub fn stop(&self) {
        self.telemetry.disconnect();
        self.clock.stop();
        self.cancel.cancel();
    }

    fn attach_episode(&self, episode: &EpisodeRef) {
        let saved = match self.store.load(&episode.id) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, episode = %episode.id, "saved position unavailable");
                None
            }
        };
        self.clock
            .attach(episode.id.clone(), episode.media_url.clone(), saved);
        self.advisor.reset();

        let mut metadata = Map::new();
        metadata.insert("episode".into(), Value::String(episode.id.to_string()));
        metadata.insert("url_param".into(), json!(self.selector.lock().url_param()));
        self.telemetry.set_heartbeat_metadata(metadata);
    }

    /// Forward hard stops: a forced disconnect tears playback down in the
    /// same scheduling tick it is observed.
    fn spawn_propagation(&self) {
        let mut rx = self.bus.subscribe();
        let clock = Arc::clone(&self.clock);
        let cancel = self.cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    event = rx.recv() => match event {
                        Ok(Event::Telemetry(TelemetryEvent::ForcedDisconnect)) => {
                            info!("forced disconnect: stopping playback");
                            clock.stop();
                            cancel.cancel();
                            break;
                        }
                        Ok(_) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(_)) => {}
                        Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        });
    }
}

impl<R: CheckRunner> Drop for WatchSession<R> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
