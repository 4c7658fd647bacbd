//! End-to-end behavior of the facade session.

use std::time::Duration;

use theatron::prelude::*;
use theatron_play::ElementEvent;

use crate::common::{config, passing_runner, Harness};

async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(30), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition never became true");
}

#[tokio::test(start_paused = true)]
async fn start_resolves_first_episode_and_attaches() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    assert_eq!(session.security_outcome(), RunState::Passed);
    assert_eq!(session.url_param(), "ep=e1");

    let loads = harness.element.loads.lock().clone();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].as_str(), "https://cdn.example.com/e1.mp4");

    wait_until(|| session.telemetry_state() == ConnectionState::Connected).await;
}

#[tokio::test(start_paused = true)]
async fn url_episode_overrides_progress() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(
        config("u1").with_url_episode(ContentId::new("e3")),
        deps,
        ContentId::new("e1"),
    )
    .await
    .unwrap();

    assert_eq!(session.url_param(), "ep=e3");
    assert_eq!(
        harness.element.loads.lock()[0].as_str(),
        "https://cdn.example.com/e3.mp4"
    );
}

#[tokio::test(start_paused = true)]
async fn next_and_previous_walk_and_reattach() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    let next = session.next_episode().unwrap();
    assert_eq!(next.id.as_str(), "e2");
    assert_eq!(session.url_param(), "ep=e2");
    assert_eq!(harness.element.loads.lock().len(), 2);

    let previous = session.previous_episode().unwrap();
    assert_eq!(previous.id.as_str(), "e1");
    assert_eq!(harness.element.loads.lock().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn selecting_current_episode_never_reattaches() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    session.select_episode(&ContentId::new("e1")).unwrap();
    session.select_episode(&ContentId::new("e1")).unwrap();
    assert_eq!(harness.element.loads.lock().len(), 1, "no reset on re-select");
}

#[tokio::test(start_paused = true)]
async fn forced_disconnect_stops_playback() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    // Get playback going.
    session.handle_element_event(ElementEvent::MetadataLoaded {
        duration: Duration::from_secs(3600),
    });
    session.play_pause().unwrap();
    assert!(session.playback().is_playing);

    // Admin pulls the plug.
    let server = harness.server.as_ref().unwrap();
    server
        .push
        .send(theatron_telemetry::ServerFrame::ForceDisconnect)
        .await
        .unwrap();

    wait_until(|| !session.playback().is_playing).await;
    wait_until(|| session.telemetry_state() == ConnectionState::Disconnected).await;
    assert!(*harness.element.pauses.lock() >= 1);
}

#[tokio::test(start_paused = true)]
async fn quality_selection_is_cosmetic() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    session.select_quality(theatron::quality::QualityLevel::P480);
    // Label switched; the media source was not reloaded.
    assert_eq!(harness.element.loads.lock().len(), 1);
    // No samples yet: the estimate falls back to the configured constant.
    assert_eq!(session.bandwidth_estimate_bps(), 5_000_000);
}

#[tokio::test(start_paused = true)]
async fn stop_tears_everything_down() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    session.stop();
    assert_eq!(session.telemetry_state(), ConnectionState::Disconnected);
    assert!(!session.playback().is_playing);
    assert!(*harness.element.pauses.lock() >= 1);
}
