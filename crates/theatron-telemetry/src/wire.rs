use serde::Serialize;
use serde_json::{Map, Value};
use theatron_core::{SessionId, UserId};

use crate::error::TelemetryError;

/// Client → server frames. Serialized as `{"event": ..., "data": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientFrame {
    /// Admin dashboards join the live overview channel.
    #[serde(rename = "admin:join-live")]
    AdminJoinLive { session_id: SessionId },

    /// Keepalive for one viewer session. The first heartbeat after a
    /// connect doubles as the session join.
    #[serde(rename = "heartbeat")]
    Heartbeat {
        session_id: SessionId,
        metadata: Map<String, Value>,
    },

    /// Admin command: force-disconnect another user's session.
    #[serde(rename = "admin:disconnect-user")]
    AdminDisconnectUser { user_id: UserId },

    /// Courtesy notice sent on clean client disconnect.
    #[serde(rename = "user:disconnected")]
    UserDisconnected { session_id: SessionId },
}

impl ClientFrame {
    pub fn to_text(&self) -> Result<String, TelemetryError> {
        serde_json::to_string(self).map_err(|e| TelemetryError::Malformed(e.to_string()))
    }
}

/// Server → client frames.
///
/// Parsed leniently: unknown events are preserved rather than rejected,
/// so a newer backend never kills the channel.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum ServerFrame {
    /// Aggregated live-session stats for admin surfaces.
    LiveStats(Value),
    /// Heartbeat acknowledgement.
    LiveHeartbeat,
    /// Another session of this user disconnected.
    LiveDisconnected(Value),
    /// An admin-initiated disconnect elsewhere completed.
    LiveAdminDisconnected(Value),
    /// Hard cancellation of THIS session. No grace period.
    ForceDisconnect,
    /// Event this client version does not know.
    Unknown { event: String, data: Value },
}

impl ServerFrame {
    pub fn parse(text: &str) -> Result<Self, TelemetryError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| TelemetryError::Malformed(e.to_string()))?;
        let event = value
            .get("event")
            .and_then(Value::as_str)
            .ok_or_else(|| TelemetryError::Malformed("missing `event`".into()))?;
        let data = value.get("data").cloned().unwrap_or(Value::Null);

        Ok(match event {
            "live:stats" => ServerFrame::LiveStats(data),
            "live:heartbeat" => ServerFrame::LiveHeartbeat,
            "live:disconnected" => ServerFrame::LiveDisconnected(data),
            "live:admin-disconnected" => ServerFrame::LiveAdminDisconnected(data),
            "force:disconnect" => ServerFrame::ForceDisconnect,
            other => ServerFrame::Unknown {
                event: other.to_string(),
                data,
            },
        })
    }
}
