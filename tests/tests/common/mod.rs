//! Shared fixtures for the integration suite.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use serde_json::json;
use theatron::prelude::*;
use theatron_play::ElementError;
use theatron_security::{CheckRunnerMock, StepResult};
use theatron_storage::MemoryProgressStore;
use theatron_telemetry::mock::{connection_pair, MockTransport, ServerEnd};
use theatron_telemetry::Transport;
use unimock::{matching, MockFn, Unimock};
use url::Url;

/// Media element fake recording every command the clock issues.
#[derive(Default)]
pub struct FakeElement {
    pub loads: Mutex<Vec<Url>>,
    pub seeks: Mutex<Vec<Duration>>,
    pub pauses: Mutex<usize>,
    pub autoplay_blocked: Mutex<bool>,
}

impl theatron_play::MediaElement for FakeElement {
    fn load(&self, url: &Url) {
        self.loads.lock().push(url.clone());
    }

    fn play(&self) -> Result<(), ElementError> {
        if *self.autoplay_blocked.lock() {
            Err(ElementError::AutoplayBlocked)
        } else {
            Ok(())
        }
    }

    fn pause(&self) {
        *self.pauses.lock() += 1;
    }

    fn request_seek(&self, position: Duration) {
        self.seeks.lock().push(position);
    }
}

/// `GET /content/:id` body: a three-episode series.
pub fn series_body() -> serde_json::Value {
    json!({
        "id": "e1",
        "series_id": "series-1",
        "ordinal": 1,
        "duration_seconds": 3600.0,
        "media_url": "https://cdn.example.com/e1.mp4",
        "title": "Pilot",
        "series_episodes": [
            {"id": "e1", "ordinal": 1, "duration_seconds": 3600.0,
             "media_url": "https://cdn.example.com/e1.mp4"},
            {"id": "e2", "ordinal": 2, "duration_seconds": 3600.0,
             "media_url": "https://cdn.example.com/e2.mp4"},
            {"id": "e3", "ordinal": 3, "duration_seconds": 3600.0,
             "media_url": "https://cdn.example.com/e3.mp4"}
        ]
    })
}

pub fn metadata_net() -> Unimock {
    Unimock::new(
        theatron_net::NetMock::get_json
            .each_call(matching!(_, _))
            .returns(Ok(series_body())),
    )
}

/// Runner where every step passes.
pub fn passing_runner() -> Unimock {
    Unimock::new(
        CheckRunnerMock::execute
            .each_call(matching!(_, _))
            .answers(&|_, step, _| Ok(StepResult::ok(format!("{step} ok")))),
    )
}

/// Runner where the geo restriction rejects.
pub fn geo_blocked_runner() -> Unimock {
    Unimock::new(
        CheckRunnerMock::execute
            .each_call(matching!(_, _))
            .answers(&|_, step, _| {
                if step == theatron_security::StepKind::GeoRestricted {
                    Ok(StepResult::rejected(
                        "region not licensed",
                        theatron_security::StepDetails::None,
                    ))
                } else {
                    Ok(StepResult::ok("ok"))
                }
            }),
    )
}

pub fn config(user: &str) -> theatron::WatchConfig {
    theatron::WatchConfig::new(
        Url::parse("https://api.example.com/").unwrap(),
        Url::parse("https://api.example.com/security/validate").unwrap(),
        Url::parse("wss://live.example.com/session").unwrap(),
        "/tmp/theatron-unused",
        UserId::new(user),
    )
}

pub struct Harness {
    pub element: Arc<FakeElement>,
    pub store: Arc<MemoryProgressStore>,
    pub server: Option<ServerEnd>,
}

impl Harness {
    /// Deps with one live mocked telemetry connection.
    pub fn with_live_telemetry<R: theatron_security::CheckRunner>(
        runner: R,
    ) -> (Self, theatron::WatchDeps<R>) {
        let (conn, server) = connection_pair();
        Self::build(runner, MockTransport::new(vec![Ok(conn)]), Some(server))
    }

    /// Deps whose telemetry transport always refuses.
    pub fn with_dead_telemetry<R: theatron_security::CheckRunner>(
        runner: R,
    ) -> (Self, theatron::WatchDeps<R>) {
        Self::build(runner, MockTransport::always_failing(), None)
    }

    fn build<R: theatron_security::CheckRunner>(
        runner: R,
        transport: MockTransport,
        server: Option<ServerEnd>,
    ) -> (Self, theatron::WatchDeps<R>) {
        let element = Arc::new(FakeElement::default());
        let store = Arc::new(MemoryProgressStore::new());
        let deps = theatron::WatchDeps {
            element: element.clone() as Arc<dyn theatron_play::MediaElement>,
            store: store.clone() as Arc<dyn theatron_storage::ProgressStore>,
            net: Arc::new(metadata_net()),
            transport: Arc::new(transport) as Arc<dyn Transport>,
            runner,
        };
        (
            Self {
                element,
                store,
                server,
            },
            deps,
        )
    }
}
