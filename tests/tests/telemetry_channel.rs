//! Channel behavior seen from the session level.

use std::time::Duration;

use theatron::prelude::*;

use crate::common::{config, passing_runner, Harness};

async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(60), async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition never became true");
}

#[tokio::test(start_paused = true)]
async fn dead_backend_degrades_to_offline_not_an_error() {
    let (_harness, deps) = Harness::with_dead_telemetry(passing_runner());

    // Session start succeeds even though telemetry can never connect.
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();
    assert_eq!(session.security_outcome(), RunState::Passed);

    // The bounded retry budget (5 × 1 s) drains, then the state is
    // terminally disconnected.
    wait_until(|| session.telemetry_state() == ConnectionState::Disconnected).await;

    // Long after, still disconnected: no endless retry loop.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(session.telemetry_state(), ConnectionState::Disconnected);
}

#[tokio::test(start_paused = true)]
async fn heartbeats_carry_the_active_episode() {
    let (mut harness, deps) = Harness::with_live_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();
    wait_until(|| session.telemetry_state() == ConnectionState::Connected).await;

    let server = harness.server.as_mut().unwrap();
    let frame = server.incoming.recv().await.unwrap();
    match frame {
        theatron_telemetry::ClientFrame::Heartbeat { metadata, .. } => {
            assert_eq!(
                metadata.get("episode"),
                Some(&serde_json::Value::String("e1".into()))
            );
        }
        other => panic!("expected heartbeat, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn playback_survives_telemetry_outage() {
    let (_harness, deps) = Harness::with_dead_telemetry(passing_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    session.handle_element_event(theatron_play::ElementEvent::MetadataLoaded {
        duration: Duration::from_secs(3600),
    });
    session.play_pause().unwrap();

    wait_until(|| session.telemetry_state() == ConnectionState::Disconnected).await;
    // Telemetry being down degrades the indicator, not the playback.
    assert!(session.playback().is_playing);
}
