//! Blocked-class outcomes must keep playback from ever starting.

use theatron::prelude::*;
use theatron_security::StepKind;

use crate::common::{config, geo_blocked_runner, Harness};

#[tokio::test(start_paused = true)]
async fn geo_blocked_session_never_attaches_media() {
    let (harness, deps) = Harness::with_live_telemetry(geo_blocked_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    assert_eq!(session.security_outcome(), RunState::Blocked);
    assert!(harness.element.loads.lock().is_empty(), "media never touched");

    // Play requests are refused silently; state stays down.
    session.play_pause().unwrap();
    assert!(!session.playback().is_playing);
}

#[tokio::test(start_paused = true)]
async fn blocked_run_stops_at_the_blocking_step() {
    let (_harness, deps) = Harness::with_live_telemetry(geo_blocked_runner());
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();

    let entries = session.audit_entries().await;
    // initial_scan, user_validation, device_geo_validation, geo_restricted.
    assert_eq!(entries.len(), 4);
    assert_eq!(entries.last().unwrap().step, StepKind::GeoRestricted);
    assert!(!entries.last().unwrap().result.valid);
    // Audit order equals execution order with strictly increasing stamps.
    for pair in entries.windows(2) {
        assert!(pair[0].timestamp_ms < pair[1].timestamp_ms);
    }
}

/// Passes the whole first run, then rejects the geo step on later runs —
/// the shape of a licensing window closing mid-session.
struct ExpiringRunner {
    calls: std::sync::atomic::AtomicU32,
}

#[async_trait::async_trait]
impl theatron_security::CheckRunner for ExpiringRunner {
    async fn execute(
        &self,
        step: StepKind,
        _ctx: &theatron_security::RunContext,
    ) -> Result<theatron_security::StepResult, theatron_security::SecurityError> {
        let call = self
            .calls
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let first_run = call < 5;
        if !first_run && step == StepKind::GeoRestricted {
            return Ok(theatron_security::StepResult::rejected(
                "license window closed",
                theatron_security::StepDetails::None,
            ));
        }
        Ok(theatron_security::StepResult::ok("ok"))
    }
}

#[tokio::test(start_paused = true)]
async fn revalidation_can_block_a_running_session() {
    let runner = ExpiringRunner {
        calls: std::sync::atomic::AtomicU32::new(0),
    };
    let (harness, deps) = Harness::with_live_telemetry(runner);
    let session = WatchSession::start(config("u1"), deps, ContentId::new("e1"))
        .await
        .unwrap();
    assert_eq!(session.security_outcome(), RunState::Passed);

    session.handle_element_event(theatron_play::ElementEvent::MetadataLoaded {
        duration: std::time::Duration::from_secs(3600),
    });
    session.play_pause().unwrap();
    assert!(session.playback().is_playing);

    // The licensing window closes; periodic revalidation catches it.
    let outcome = session.revalidate().await.unwrap();
    assert_eq!(outcome, RunState::Blocked);
    assert_eq!(session.security_outcome(), RunState::Blocked);
    assert!(!session.playback().is_playing, "hard stop on blocked outcome");
    assert!(*harness.element.pauses.lock() >= 1);
}
