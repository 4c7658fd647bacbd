//! The restore → periodic-persist → delete-on-ended cycle.

use std::time::Duration;

use theatron::prelude::*;
use theatron_play::ElementEvent;
use theatron_storage::ProgressStore;

use crate::common::{config, passing_runner, Harness};

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

#[tokio::test(start_paused = true)]
async fn saved_position_restores_once_metadata_loads() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    harness
        .store
        .save(&ContentId::new("e1"), secs(1800))
        .unwrap();

    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    // Nothing restored before metadata.
    assert!(harness.element.seeks.lock().is_empty());

    session.handle_element_event(ElementEvent::MetadataLoaded {
        duration: secs(3600),
    });
    assert_eq!(harness.element.seeks.lock().as_slice(), &[secs(1800)]);
}

#[tokio::test(start_paused = true)]
async fn positions_persist_on_cadence_and_clear_on_ended() {
    let (harness, deps) = Harness::with_live_telemetry(passing_runner());
    harness
        .store
        .save(&ContentId::new("e1"), secs(1800))
        .unwrap();

    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    session.handle_element_event(ElementEvent::MetadataLoaded {
        duration: secs(3600),
    });
    session.handle_element_event(ElementEvent::Seeked);
    session.play_pause().unwrap();

    // The player advances past the restore point.
    session.handle_element_event(ElementEvent::TimeUpdate {
        position: secs(1805),
    });

    // Let the ticker run a few virtual persist intervals.
    tokio::time::sleep(Duration::from_secs(7)).await;

    let persisted = harness.store.load(&ContentId::new("e1")).unwrap().unwrap();
    assert!(
        persisted >= secs(1805),
        "persistence should have advanced past the restore point: {persisted:?}"
    );

    // Finishing the episode deletes the key, so the next watch starts
    // from zero.
    session.handle_element_event(ElementEvent::Ended);
    assert_eq!(harness.store.load(&ContentId::new("e1")).unwrap(), None);
    assert!(!session.playback().is_playing);
}

#[tokio::test(start_paused = true)]
async fn watched_episode_resolves_continuity_to_next() {
    let (_harness, deps) = Harness::with_live_telemetry(passing_runner());
    // e1 watched to 95%.
    deps.store
        .save(&ContentId::new("e1"), secs(3420))
        .unwrap();

    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();
    assert_eq!(session.url_param(), "ep=e2");
}
