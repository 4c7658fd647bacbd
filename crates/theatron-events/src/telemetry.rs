#![forbid(unsafe_code)]

/// Events published by the live telemetry channel.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum TelemetryEvent {
    /// The channel established a connection and heartbeats are running.
    Connected,
    /// A reconnection attempt is in progress (1-based).
    Reconnecting { attempt: u32 },
    /// The retry budget is exhausted or the channel was closed for good;
    /// no further automatic attempts will be made.
    Disconnected { reason: String },
    /// The server acknowledged a heartbeat.
    HeartbeatAcked,
    /// Live session stats pushed by the backend (viewer counts etc.),
    /// forwarded as raw JSON for the admin surface.
    StatsReceived { payload: String },
    /// An administrator force-disconnected this session. Hard stop:
    /// playback must halt and the channel is torn down immediately.
    ForcedDisconnect,
}
