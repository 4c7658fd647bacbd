use std::{
    sync::Arc,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use parking_lot::Mutex;
use serde_json::{Map, Value};
use theatron_core::{SessionId, UserId};
use theatron_events::{EventBus, TelemetryEvent};
use theatron_net::RetryPolicy;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;

use crate::{
    error::TelemetryError,
    transport::{Connection, Transport},
    wire::{ClientFrame, ServerFrame},
    TelemetryResult,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ConnectionState {
    #[default]
    Connecting,
    Connected,
    Reconnecting,
    Disconnected,
}

/// Snapshot of the channel for the UI and admin surfaces.
#[derive(Clone, Debug)]
pub struct TelemetrySession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub last_heartbeat_at_ms: Option<u64>,
    pub connection_state: ConnectionState,
}

#[derive(Clone, Debug)]
pub struct TelemetryOptions {
    pub endpoint: Url,
    pub heartbeat_interval: Duration,
    /// Reconnect budget per outage. Deliberately fixed-delay: the design
    /// favors fast, bounded recovery over exponential politeness.
    pub reconnect: RetryPolicy,
}

impl TelemetryOptions {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            heartbeat_interval: Duration::from_secs(10),
            reconnect: RetryPolicy::fixed(5, Duration::from_secs(1)),
        }
    }
}

#[derive(Debug)]
struct ChannelShared {
    state: Mutex<ConnectionState>,
    outbound: Mutex<Option<mpsc::Sender<ClientFrame>>>,
    last_heartbeat_at_ms: Mutex<Option<u64>>,
    heartbeat_metadata: Mutex<Map<String, Value>>,
}

enum CloseReason {
    /// Remote closed or the socket died; reconnect.
    Dropped,
    /// Server commanded a hard stop; never reconnect.
    Forced,
    /// Local teardown.
    Cancelled,
}

/// One long-lived bidirectional channel per watch session.
///
/// Explicitly constructed and explicitly lifecycled — the application
/// root owns it and hands clones of the [`EventBus`] around instead of a
/// hidden global. Connect once; the driver keeps heartbeats flowing and
/// reconnects through outages within the retry budget. Outbound sends
/// while not connected are dropped by design, never queued.
pub struct TelemetryChannel {
    opts: TelemetryOptions,
    transport: Arc<dyn Transport>,
    bus: EventBus,
    session_id: SessionId,
    user_id: UserId,
    shared: Arc<ChannelShared>,
    cancel: CancellationToken,
    driver: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl TelemetryChannel {
    pub fn new(
        transport: Arc<dyn Transport>,
        opts: TelemetryOptions,
        session_id: SessionId,
        user_id: UserId,
        bus: EventBus,
    ) -> Self {
        Self {
            opts,
            transport,
            bus,
            session_id,
            user_id,
            shared: Arc::new(ChannelShared {
                state: Mutex::new(ConnectionState::Connecting),
                outbound: Mutex::new(None),
                last_heartbeat_at_ms: Mutex::new(None),
                heartbeat_metadata: Mutex::new(Map::new()),
            }),
            cancel: CancellationToken::new(),
            driver: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.shared.state.lock()
    }

    #[must_use]
    pub fn session(&self) -> TelemetrySession {
        TelemetrySession {
            session_id: self.session_id,
            user_id: self.user_id.clone(),
            last_heartbeat_at_ms: *self.shared.last_heartbeat_at_ms.lock(),
            connection_state: self.state(),
        }
    }

    /// Replace the metadata object attached to every heartbeat (playback
    /// position, episode id and the like).
    pub fn set_heartbeat_metadata(&self, metadata: Map<String, Value>) {
        *self.shared.heartbeat_metadata.lock() = metadata;
    }

    /// Token cancelled when the channel is torn down (forced disconnect
    /// included). Consumers hard-stop playback off this.
    #[must_use]
    pub fn cancelled_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Start the driver. Returns an error if already started.
    pub fn connect(&self) -> TelemetryResult<()> {
        let mut driver = self.driver.lock();
        if driver.is_some() {
            return Err(TelemetryError::Connect("already connected".into()));
        }

        let task = tokio::spawn(drive(
            Arc::clone(&self.transport),
            self.opts.clone(),
            self.session_id,
            Arc::clone(&self.shared),
            self.bus.clone(),
            self.cancel.clone(),
        ));
        *driver = Some(task);
        Ok(())
    }

    /// Fire-and-forget send. While not connected the frame is dropped and
    /// logged — telemetry favors simplicity over at-least-once delivery.
    pub fn send(&self, frame: ClientFrame) {
        if self.state() != ConnectionState::Connected {
            debug!("telemetry frame dropped: channel not connected");
            return;
        }
        let guard = self.shared.outbound.lock();
        match guard.as_ref() {
            Some(tx) => {
                if let Err(e) = tx.try_send(frame) {
                    debug!(error = %e, "telemetry frame dropped: outbound full or closed");
                }
            }
            None => debug!("telemetry frame dropped: no live connection"),
        }
    }

    /// Clean local disconnect: courtesy notice, then teardown.
    pub fn disconnect(&self) {
        self.send(ClientFrame::UserDisconnected {
            session_id: self.session_id,
        });
        self.cancel.cancel();
        *self.shared.state.lock() = ConnectionState::Disconnected;
        self.bus.publish(TelemetryEvent::Disconnected {
            reason: "client disconnect".into(),
        });
    }
}

impl Drop for TelemetryChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

async fn drive(
    transport: Arc<dyn Transport>,
    opts: TelemetryOptions,
    session_id: SessionId,
    shared: Arc<ChannelShared>,
    bus: EventBus,
    cancel: CancellationToken,
) {
    // Attempt 0 is the initial connect; 1..=budget are reconnects, each
    // after the fixed delay. The budget resets on every successful
    // connection.
    let mut attempt: u32 = 0;

    loop {
        if attempt > 0 {
            *shared.state.lock() = ConnectionState::Reconnecting;
            bus.publish(TelemetryEvent::Reconnecting { attempt });

            tokio::select! {
                () = cancel.cancelled() => {
                    *shared.state.lock() = ConnectionState::Disconnected;
                    return;
                }
                () = tokio::time::sleep(opts.reconnect.delay_for_attempt(attempt)) => {}
            }
        }

        match transport.connect(&opts.endpoint).await {
            Ok(connection) => {
                info!(%session_id, "telemetry channel connected");
                attempt = 0;
                *shared.outbound.lock() = Some(connection.outbound.clone());
                *shared.state.lock() = ConnectionState::Connected;
                bus.publish(TelemetryEvent::Connected);

                let reason =
                    run_connection(connection, &opts, session_id, &shared, &bus, &cancel).await;
                *shared.outbound.lock() = None;

                match reason {
                    CloseReason::Dropped => {
                        warn!("telemetry connection dropped");
                    }
                    CloseReason::Forced => {
                        *shared.state.lock() = ConnectionState::Disconnected;
                        bus.publish(TelemetryEvent::ForcedDisconnect);
                        cancel.cancel();
                        return;
                    }
                    CloseReason::Cancelled => {
                        *shared.state.lock() = ConnectionState::Disconnected;
                        return;
                    }
                }
            }
            Err(e) => {
                debug!(error = %e, attempt, "telemetry connect attempt failed");
            }
        }

        attempt += 1;
        if attempt > opts.reconnect.max_attempts {
            *shared.state.lock() = ConnectionState::Disconnected;
            bus.publish(TelemetryEvent::Disconnected {
                reason: "reconnect attempts exhausted".into(),
            });
            return;
        }
    }
}

async fn run_connection(
    mut connection: Connection,
    opts: &TelemetryOptions,
    session_id: SessionId,
    shared: &ChannelShared,
    bus: &EventBus,
    cancel: &CancellationToken,
) -> CloseReason {
    // The first tick fires immediately, so the first heartbeat doubles as
    // the session join.
    let mut heartbeat = tokio::time::interval(opts.heartbeat_interval);

    loop {
        tokio::select! {
            () = cancel.cancelled() => return CloseReason::Cancelled,

            _ = heartbeat.tick() => {
                let frame = ClientFrame::Heartbeat {
                    session_id,
                    metadata: shared.heartbeat_metadata.lock().clone(),
                };
                if connection.outbound.try_send(frame).is_err() {
                    debug!("heartbeat dropped: outbound closed");
                } else {
                    *shared.last_heartbeat_at_ms.lock() = Some(epoch_ms());
                }
            }

            frame = connection.inbound.recv() => match frame {
                None => return CloseReason::Dropped,
                Some(ServerFrame::ForceDisconnect) => {
                    info!(%session_id, "forced disconnect received");
                    return CloseReason::Forced;
                }
                Some(ServerFrame::LiveHeartbeat) => {
                    bus.publish(TelemetryEvent::HeartbeatAcked);
                }
                Some(ServerFrame::LiveStats(payload)) => {
                    bus.publish(TelemetryEvent::StatsReceived {
                        payload: payload.to_string(),
                    });
                }
                Some(other) => debug!(?other, "unhandled server frame"),
            }
        }
    }
}
