use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use parking_lot::Mutex;
use theatron_core::ContentId;
use theatron_events::{EventBus, PlayerEvent};
use theatron_storage::ProgressStore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::{
    element::{ElementError, ElementEvent, MediaElement},
    error::PlayError,
    types::{BufferedRanges, PlaybackState},
};

#[derive(Clone, Debug)]
pub struct PlayOptions {
    /// How long a "waiting for data" condition must persist before the
    /// clock reports buffering. Brief stalls never reach the UI.
    pub buffering_debounce: Duration,
    /// Minimum spacing between applied position updates.
    pub time_update_throttle: Duration,
    /// Cadence of position persistence while playing.
    pub persist_interval: Duration,
    /// Cadence of the internal ticker driving debounce and persistence.
    pub tick_interval: Duration,
}

impl Default for PlayOptions {
    fn default() -> Self {
        Self {
            buffering_debounce: Duration::from_millis(800),
            time_update_throttle: Duration::from_millis(100),
            persist_interval: Duration::from_secs(3),
            tick_interval: Duration::from_millis(250),
        }
    }
}

struct ClockInner {
    content: Option<ContentId>,
    source: Option<Url>,
    state: PlaybackState,
    /// Saved position to restore once metadata arrives. Cleared by a
    /// superseding attach.
    pending_restore: Option<Duration>,
    /// Seek target in flight; position reads keep the pre-seek value until
    /// the element confirms.
    pending_seek: Option<Duration>,
    waiting_since: Option<Instant>,
    last_time_update: Option<Instant>,
    last_persist: Option<Instant>,
}

impl ClockInner {
    fn new() -> Self {
        Self {
            content: None,
            source: None,
            state: PlaybackState::default(),
            pending_restore: None,
            pending_seek: None,
            waiting_since: None,
            last_time_update: None,
            last_persist: None,
        }
    }

    fn clamp_to_duration(&self, target: Duration) -> Duration {
        match self.state.duration {
            Some(duration) => target.min(duration),
            None => target,
        }
    }
}

/// Owns the timing state of the attached media source.
///
/// The clock is a sync state machine: the embedding layer forwards element
/// callbacks into [`handle_event`](Self::handle_event), and a ticker task
/// (see [`spawn_ticker`](Self::spawn_ticker)) drives time-based behavior —
/// the buffering debounce and periodic position persistence. All externally
/// observable changes are published as [`PlayerEvent`]s.
pub struct PlaybackClock {
    element: Arc<dyn MediaElement>,
    store: Arc<dyn ProgressStore>,
    bus: EventBus,
    opts: PlayOptions,
    inner: Mutex<ClockInner>,
}

impl PlaybackClock {
    pub fn new(
        element: Arc<dyn MediaElement>,
        store: Arc<dyn ProgressStore>,
        bus: EventBus,
        opts: PlayOptions,
    ) -> Self {
        Self {
            element,
            store,
            bus,
            opts,
            inner: Mutex::new(ClockInner::new()),
        }
    }

    /// Bind a new media source, resetting all timing state.
    ///
    /// If `saved_position` is given it is restored with a one-shot seek
    /// once metadata loads (and only if it is inside the duration).
    /// Attaching the already-current source is a no-op, so re-selecting
    /// the current episode never resets playback. Attaching a different
    /// source supersedes the previous one: its pending restore and seek
    /// are discarded.
    pub fn attach(&self, content: ContentId, source: Url, saved_position: Option<Duration>) {
        let mut inner = self.inner.lock();
        if inner.source.as_ref() == Some(&source) {
            debug!(%source, "attach skipped: source unchanged");
            return;
        }

        *inner = ClockInner::new();
        inner.content = Some(content);
        inner.source = Some(source.clone());
        inner.state.is_loading = true;
        inner.pending_restore = saved_position;
        drop(inner);

        self.element.load(&source);
        self.bus.publish(PlayerEvent::SourceAttached);
    }

    /// Snapshot of the current playback state.
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.inner.lock().state.clone()
    }

    /// Current position. While a seek is in flight this returns the
    /// pre-seek value, so the UI timeline does not flicker.
    #[must_use]
    pub fn position(&self) -> Duration {
        self.inner.lock().state.position
    }

    /// Toggle play/pause.
    ///
    /// An autoplay-policy refusal is surfaced as
    /// [`PlayerEvent::AutoplayBlocked`] and is not an error.
    pub fn toggle_play(&self) -> Result<(), PlayError> {
        let mut inner = self.inner.lock();
        if inner.source.is_none() {
            return Err(PlayError::NoSource);
        }

        if inner.state.is_playing {
            inner.state.is_playing = false;
            drop(inner);
            self.element.pause();
            self.bus.publish(PlayerEvent::PlayingChanged { playing: false });
            return Ok(());
        }
        drop(inner);

        match self.element.play() {
            Ok(()) => {
                self.inner.lock().state.is_playing = true;
                self.bus.publish(PlayerEvent::PlayingChanged { playing: true });
            }
            Err(ElementError::AutoplayBlocked) => {
                self.bus.publish(PlayerEvent::AutoplayBlocked);
            }
            Err(ElementError::Failed(message)) => {
                warn!(%message, "element failed to start playback");
                self.fail(message);
            }
        }
        Ok(())
    }

    /// Seek to `target`, clamped into `[0, duration]`. Returns the clamped
    /// target. Position reads keep the pre-seek value until the element
    /// confirms via [`ElementEvent::Seeked`].
    pub fn seek(&self, target: Duration) -> Result<Duration, PlayError> {
        let mut inner = self.inner.lock();
        if inner.source.is_none() {
            return Err(PlayError::NoSource);
        }

        let clamped = inner.clamp_to_duration(target);
        inner.state.is_seeking = true;
        inner.pending_seek = Some(clamped);
        inner.waiting_since = None;
        drop(inner);

        self.element.request_seek(clamped);
        self.bus.publish(PlayerEvent::SeekStarted { target: clamped });
        Ok(clamped)
    }

    /// Skip by `delta_secs` (negative rewinds), clamped into
    /// `[0, duration]`. Returns the resulting target.
    pub fn skip(&self, delta_secs: f64) -> Result<Duration, PlayError> {
        let current = {
            let inner = self.inner.lock();
            if inner.source.is_none() {
                return Err(PlayError::NoSource);
            }
            inner.state.position
        };

        let target_secs = (current.as_secs_f64() + delta_secs).max(0.0);
        self.seek(Duration::from_secs_f64(target_secs))
    }

    /// Apply one element notification. `now` is the arrival instant.
    pub fn handle_event(&self, event: ElementEvent, now: Instant) {
        match event {
            ElementEvent::MetadataLoaded { duration } => self.on_metadata(duration),
            ElementEvent::TimeUpdate { position } => self.on_time_update(position, now),
            ElementEvent::BufferedChanged { ranges } => {
                self.inner.lock().state.buffered = BufferedRanges::new(ranges);
            }
            ElementEvent::Waiting => {
                let mut inner = self.inner.lock();
                if inner.state.is_playing && !inner.state.is_seeking
                    && inner.waiting_since.is_none()
                {
                    inner.waiting_since = Some(now);
                }
            }
            ElementEvent::Playing | ElementEvent::CanPlay => self.on_ready(),
            ElementEvent::Seeked => self.on_seeked(),
            ElementEvent::Ended => self.on_ended(),
            ElementEvent::Error { message } => {
                warn!(%message, "media element error");
                self.fail(message);
            }
        }
    }

    /// Drive time-based behavior: the buffering debounce and periodic
    /// persistence. Called by the ticker task; tests call it directly with
    /// synthetic instants.
    pub fn tick(&self, now: Instant) {
        self.check_buffering_debounce(now);
        self.maybe_persist(now);
    }

    /// Spawn the ticker driving [`tick`](Self::tick) until `cancel` fires.
    pub fn spawn_ticker(
        self: &Arc<Self>,
        cancel: CancellationToken,
    ) -> tokio::task::JoinHandle<()> {
        let clock = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(clock.opts.tick_interval);
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    _ = interval.tick() => clock.tick(Instant::now()),
                }
            }
        })
    }

    /// Hard-stop playback and detach the source (forced disconnect or
    /// session teardown). State degrades to the "no playable video" view.
    pub fn stop(&self) {
        let was_attached = {
            let mut inner = self.inner.lock();
            let was_attached = inner.source.is_some();
            *inner = ClockInner::new();
            was_attached
        };
        if was_attached {
            self.element.pause();
            self.bus.publish(PlayerEvent::PlayingChanged { playing: false });
        }
    }

    fn on_metadata(&self, duration: Duration) {
        let restore = {
            let mut inner = self.inner.lock();
            inner.state.duration = Some(duration);
            inner.state.is_loading = false;
            match inner.pending_restore.take() {
                Some(saved) if saved < duration => Some(saved),
                _ => None,
            }
        };

        self.bus.publish(PlayerEvent::DurationChanged { duration });

        if let Some(position) = restore {
            debug!(?position, "restoring saved position");
            if self.seek(position).is_ok() {
                self.bus.publish(PlayerEvent::PositionRestored { position });
            }
        }
    }

    fn on_time_update(&self, position: Duration, now: Instant) {
        let resumed = {
            let mut inner = self.inner.lock();
            if inner.state.is_seeking {
                return;
            }
            if let Some(last) = inner.last_time_update {
                if now.duration_since(last) < self.opts.time_update_throttle {
                    return;
                }
            }
            inner.last_time_update = Some(now);
            inner.state.position = inner.clamp_to_duration(position);

            // The media advanced, so any stall is over.
            inner.waiting_since = None;
            let resumed = inner.state.is_buffering;
            inner.state.is_buffering = false;
            resumed
        };
        if resumed {
            self.bus.publish(PlayerEvent::BufferingChanged { buffering: false });
        }
    }

    fn on_ready(&self) {
        let resumed = {
            let mut inner = self.inner.lock();
            inner.waiting_since = None;
            inner.state.is_loading = false;
            let resumed = inner.state.is_buffering;
            inner.state.is_buffering = false;
            resumed
        };
        if resumed {
            self.bus.publish(PlayerEvent::BufferingChanged { buffering: false });
        }
    }

    fn on_seeked(&self) {
        let position = {
            let mut inner = self.inner.lock();
            inner.state.is_seeking = false;
            if let Some(target) = inner.pending_seek.take() {
                inner.state.position = inner.clamp_to_duration(target);
            }
            inner.state.position
        };
        self.bus.publish(PlayerEvent::SeekCompleted { position });
    }

    fn on_ended(&self) {
        let content = {
            let mut inner = self.inner.lock();
            inner.state.is_playing = false;
            inner.waiting_since = None;
            inner.last_persist = None;
            inner.content.clone()
        };

        // Finished content restarts from zero next time.
        if let Some(content) = content {
            if let Err(e) = self.store.remove(&content) {
                warn!(error = %e, %content, "failed to clear persisted position");
            }
        }
        self.bus.publish(PlayerEvent::DidPlayToEnd);
    }

    fn fail(&self, message: String) {
        {
            let mut inner = self.inner.lock();
            inner.state.is_loading = false;
            inner.state.is_buffering = false;
            inner.state.is_playing = false;
            inner.waiting_since = None;
        }
        self.bus.publish(PlayerEvent::PlaybackFailed { message });
    }

    fn check_buffering_debounce(&self, now: Instant) {
        let entered = {
            let mut inner = self.inner.lock();
            let stalled = matches!(
                inner.waiting_since,
                Some(since) if now.duration_since(since) >= self.opts.buffering_debounce
            );
            if stalled
                && inner.state.is_playing
                && !inner.state.is_seeking
                && !inner.state.is_buffering
            {
                inner.state.is_buffering = true;
                true
            } else {
                false
            }
        };
        if entered {
            self.bus.publish(PlayerEvent::BufferingChanged { buffering: true });
        }
    }

    fn maybe_persist(&self, now: Instant) {
        let to_persist = {
            let mut inner = self.inner.lock();
            let position = inner.state.position;
            let has_duration = inner.state.duration.is_some_and(|d| !d.is_zero());
            if position.is_zero() || !has_duration {
                return;
            }
            let due = match inner.last_persist {
                None => true,
                Some(last) => now.duration_since(last) >= self.opts.persist_interval,
            };
            if !due {
                return;
            }
            inner.last_persist = Some(now);
            inner.content.clone().map(|content| (content, position))
        };

        if let Some((content, position)) = to_persist {
            if let Err(e) = self.store.save(&content, position) {
                warn!(error = %e, %content, "failed to persist playback position");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;
    use rstest::rstest;
    use theatron_events::Event;
    use theatron_storage::MemoryProgressStore;

    use super::*;
    use crate::types::TimeRange;

    /// Element fake recording issued commands.
    #[derive(Default)]
    struct FakeElement {
        loads: Mutex<Vec<Url>>,
        seeks: Mutex<Vec<Duration>>,
        pauses: Mutex<usize>,
        play_result: Mutex<Option<ElementError>>,
    }

    impl FakeElement {
        fn reject_autoplay(&self) {
            *self.play_result.lock() = Some(ElementError::AutoplayBlocked);
        }
    }

    impl MediaElement for FakeElement {
        fn load(&self, url: &Url) {
            self.loads.lock().push(url.clone());
        }

        fn play(&self) -> Result<(), ElementError> {
            match self.play_result.lock().clone() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }

        fn pause(&self) {
            *self.pauses.lock() += 1;
        }

        fn request_seek(&self, position: Duration) {
            self.seeks.lock().push(position);
        }
    }

    struct Fixture {
        clock: PlaybackClock,
        element: Arc<FakeElement>,
        store: Arc<MemoryProgressStore>,
        bus: EventBus,
    }

    fn fixture() -> Fixture {
        let element = Arc::new(FakeElement::default());
        let store = Arc::new(MemoryProgressStore::new());
        let bus = EventBus::new(64);
        let clock = PlaybackClock::new(
            element.clone(),
            store.clone(),
            bus.clone(),
            PlayOptions::default(),
        );
        Fixture {
            clock,
            element,
            store,
            bus,
        }
    }

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn attach(f: &Fixture, saved: Option<Duration>) {
        f.clock.attach(
            ContentId::new("ep-1"),
            Url::parse("https://cdn.example.com/ep-1.mp4").unwrap(),
            saved,
        );
    }

    fn load_metadata(f: &Fixture, duration: Duration) {
        f.clock
            .handle_event(ElementEvent::MetadataLoaded { duration }, Instant::now());
    }

    #[test]
    fn attach_same_source_is_idempotent() {
        let f = fixture();
        attach(&f, None);
        attach(&f, None);
        assert_eq!(f.element.loads.lock().len(), 1);
    }

    #[test]
    fn attach_new_source_resets_state() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(100));
        f.clock
            .handle_event(ElementEvent::TimeUpdate { position: secs(50) }, Instant::now());

        f.clock.attach(
            ContentId::new("ep-2"),
            Url::parse("https://cdn.example.com/ep-2.mp4").unwrap(),
            None,
        );
        let state = f.clock.state();
        assert_eq!(state.position, Duration::ZERO);
        assert_eq!(state.duration, None);
        assert!(state.is_loading);
    }

    #[rstest]
    #[case::inside(50, 120, 50)]
    #[case::beyond_end(500, 120, 120)]
    fn seek_clamps_into_duration(
        #[case] target: u64,
        #[case] duration: u64,
        #[case] expected: u64,
    ) {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(duration));

        let landed = f.clock.seek(secs(target)).unwrap();
        assert_eq!(landed, secs(expected));
        assert_eq!(f.element.seeks.lock().last().copied(), Some(secs(expected)));
    }

    #[test]
    fn skip_clamps_at_both_ends() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(120));

        // current=100, duration=120, skip(+30) => 120
        f.clock
            .handle_event(ElementEvent::TimeUpdate { position: secs(100) }, Instant::now());
        let forward = f.clock.skip(30.0).unwrap();
        assert_eq!(forward, secs(120));

        f.clock.handle_event(ElementEvent::Seeked, Instant::now());
        let backward = f.clock.skip(-500.0).unwrap();
        assert_eq!(backward, Duration::ZERO);
    }

    #[test]
    fn position_reads_pre_seek_value_while_seeking() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(100));
        f.clock
            .handle_event(ElementEvent::TimeUpdate { position: secs(10) }, Instant::now());

        f.clock.seek(secs(80)).unwrap();
        assert_eq!(f.clock.position(), secs(10));
        assert!(f.clock.state().is_seeking);

        // Element reports mid-seek time updates; they must not leak through.
        let later = Instant::now() + Duration::from_secs(1);
        f.clock
            .handle_event(ElementEvent::TimeUpdate { position: secs(42) }, later);
        assert_eq!(f.clock.position(), secs(10));

        f.clock.handle_event(ElementEvent::Seeked, Instant::now());
        assert_eq!(f.clock.position(), secs(80));
        assert!(!f.clock.state().is_seeking);
    }

    #[test]
    fn operations_without_source_fail_visibly() {
        let f = fixture();
        assert!(matches!(f.clock.seek(secs(1)), Err(PlayError::NoSource)));
        assert!(matches!(f.clock.skip(5.0), Err(PlayError::NoSource)));
        assert!(matches!(f.clock.toggle_play(), Err(PlayError::NoSource)));
    }

    #[test]
    fn autoplay_rejection_is_surfaced_not_thrown() {
        let f = fixture();
        let mut rx = f.bus.subscribe();
        attach(&f, None);
        f.element.reject_autoplay();

        f.clock.toggle_play().unwrap();
        assert!(!f.clock.state().is_playing);

        let mut saw_blocked = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, Event::Player(PlayerEvent::AutoplayBlocked)) {
                saw_blocked = true;
            }
        }
        assert!(saw_blocked);
    }

    #[test]
    fn buffering_needs_the_debounce_window() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(100));
        f.clock.toggle_play().unwrap();

        let t0 = Instant::now();
        f.clock.handle_event(ElementEvent::Waiting, t0);

        // Brief stall: under the window, no buffering.
        f.clock.tick(t0 + Duration::from_millis(300));
        assert!(!f.clock.state().is_buffering);

        // Stall persists past the window.
        f.clock.tick(t0 + Duration::from_millis(900));
        assert!(f.clock.state().is_buffering);

        // Cleared immediately on resume.
        f.clock.handle_event(ElementEvent::Playing, t0 + secs(1));
        assert!(!f.clock.state().is_buffering);
    }

    #[test]
    fn stall_while_paused_never_buffers() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(100));

        let t0 = Instant::now();
        f.clock.handle_event(ElementEvent::Waiting, t0);
        f.clock.tick(t0 + secs(5));
        assert!(!f.clock.state().is_buffering);
    }

    #[test]
    fn time_updates_are_throttled() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(100));

        let t0 = Instant::now();
        f.clock
            .handle_event(ElementEvent::TimeUpdate { position: secs(10) }, t0);
        // 50ms later: under the 100ms floor, ignored.
        f.clock.handle_event(
            ElementEvent::TimeUpdate { position: secs(11) },
            t0 + Duration::from_millis(50),
        );
        assert_eq!(f.clock.position(), secs(10));

        f.clock.handle_event(
            ElementEvent::TimeUpdate { position: secs(12) },
            t0 + Duration::from_millis(150),
        );
        assert_eq!(f.clock.position(), secs(12));
    }

    #[test]
    fn restore_seeks_once_after_metadata() {
        let f = fixture();
        attach(&f, Some(secs(1800)));
        assert!(f.element.seeks.lock().is_empty());

        load_metadata(&f, secs(3600));
        assert_eq!(f.element.seeks.lock().as_slice(), &[secs(1800)]);

        // A second metadata event must not restore again.
        load_metadata(&f, secs(3600));
        assert_eq!(f.element.seeks.lock().len(), 1);
    }

    #[test]
    fn restore_beyond_duration_is_dropped() {
        let f = fixture();
        attach(&f, Some(secs(5000)));
        load_metadata(&f, secs(3600));
        assert!(f.element.seeks.lock().is_empty());
    }

    #[test]
    fn persistence_runs_on_the_configured_cadence() {
        let f = fixture();
        let content = ContentId::new("ep-1");
        attach(&f, None);
        load_metadata(&f, secs(3600));
        f.clock
            .handle_event(ElementEvent::TimeUpdate { position: secs(1800) }, Instant::now());

        let t0 = Instant::now();
        f.clock.tick(t0);
        assert_eq!(f.store.load(&content).unwrap(), Some(secs(1800)));

        // Advance position; next tick inside the interval does not write.
        f.clock.handle_event(
            ElementEvent::TimeUpdate { position: secs(1810) },
            t0 + secs(1),
        );
        f.clock.tick(t0 + secs(1));
        assert_eq!(f.store.load(&content).unwrap(), Some(secs(1800)));

        // Past the interval it does.
        f.clock.tick(t0 + secs(4));
        assert_eq!(f.store.load(&content).unwrap(), Some(secs(1810)));
    }

    #[test]
    fn zero_position_is_never_persisted() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(3600));
        f.clock.tick(Instant::now());
        assert!(f.store.is_empty());
    }

    #[test]
    fn ended_clears_the_persisted_position() {
        let f = fixture();
        let content = ContentId::new("ep-1");
        attach(&f, None);
        load_metadata(&f, secs(100));
        f.clock
            .handle_event(ElementEvent::TimeUpdate { position: secs(50) }, Instant::now());
        f.clock.tick(Instant::now());
        assert!(f.store.load(&content).unwrap().is_some());

        f.clock.handle_event(ElementEvent::Ended, Instant::now());
        assert_eq!(f.store.load(&content).unwrap(), None);
        assert!(!f.clock.state().is_playing);
    }

    #[test]
    fn element_error_degrades_without_panicking() {
        let f = fixture();
        let mut rx = f.bus.subscribe();
        attach(&f, None);
        load_metadata(&f, secs(100));
        f.clock.toggle_play().unwrap();

        f.clock.handle_event(
            ElementEvent::Error {
                message: "decode failure".into(),
            },
            Instant::now(),
        );

        let state = f.clock.state();
        assert!(!state.is_loading);
        assert!(!state.is_buffering);
        assert!(!state.is_playing);

        let mut saw_failed = false;
        while let Ok(event) = rx.try_recv() {
            if matches!(event, Event::Player(PlayerEvent::PlaybackFailed { .. })) {
                saw_failed = true;
            }
        }
        assert!(saw_failed);
    }

    #[test]
    fn buffered_ranges_are_normalized_on_update() {
        let f = fixture();
        attach(&f, None);
        f.clock.handle_event(
            ElementEvent::BufferedChanged {
                ranges: vec![
                    TimeRange::new(secs(10), secs(20)),
                    TimeRange::new(secs(0), secs(12)),
                ],
            },
            Instant::now(),
        );
        let state = f.clock.state();
        assert_eq!(state.buffered.as_slice(), &[TimeRange::new(secs(0), secs(20))]);
    }

    #[test]
    fn stop_pauses_and_detaches() {
        let f = fixture();
        attach(&f, None);
        load_metadata(&f, secs(100));
        f.clock.toggle_play().unwrap();

        f.clock.stop();
        assert_eq!(*f.element.pauses.lock(), 1);
        assert!(!f.clock.state().is_playing);
        assert!(matches!(f.clock.seek(secs(1)), Err(PlayError::NoSource)));
    }
}
