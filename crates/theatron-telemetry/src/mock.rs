//! Channel-backed transport fake for tests.

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;
use url::Url;

use crate::{
    error::TelemetryError,
    transport::{Connection, Transport},
    wire::{ClientFrame, ServerFrame},
};

/// The test's end of a mocked connection.
pub struct ServerEnd {
    /// Frames the client sent.
    pub incoming: mpsc::Receiver<ClientFrame>,
    /// Inject server frames. Dropping this closes the connection.
    pub push: mpsc::Sender<ServerFrame>,
}

/// Build a connected pair: the [`Connection`] goes into the transport
/// script, the [`ServerEnd`] stays with the test.
#[must_use]
pub fn connection_pair() -> (Connection, ServerEnd) {
    let (out_tx, out_rx) = mpsc::channel(32);
    let (in_tx, in_rx) = mpsc::channel(32);
    (
        Connection {
            outbound: out_tx,
            inbound: in_rx,
        },
        ServerEnd {
            incoming: out_rx,
            push: in_tx,
        },
    )
}

/// Scripted transport: each `connect()` pops the next outcome. An empty
/// script refuses the connection, which is what a dead backend looks like.
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Connection, TelemetryError>>>,
    connect_calls: Mutex<u32>,
}

impl MockTransport {
    #[must_use]
    pub fn new(script: Vec<Result<Connection, TelemetryError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            connect_calls: Mutex::new(0),
        }
    }

    /// Transport that refuses every connection attempt.
    #[must_use]
    pub fn always_failing() -> Self {
        Self::new(vec![])
    }

    #[must_use]
    pub fn connect_calls(&self) -> u32 {
        *self.connect_calls.lock()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn connect(&self, _url: &Url) -> Result<Connection, TelemetryError> {
        *self.connect_calls.lock() += 1;
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(TelemetryError::Connect("refused".into())))
    }
}
