use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};
use url::Url;

use crate::{
    error::TelemetryError,
    wire::{ClientFrame, ServerFrame},
};

/// One established connection: frames in, frames out.
///
/// Dropping the inbound receiver or the remote closing the socket ends
/// the connection; the channel reacts by reconnecting.
pub struct Connection {
    pub outbound: mpsc::Sender<ClientFrame>,
    pub inbound: mpsc::Receiver<ServerFrame>,
}

/// Seam over the underlying socket, so the channel logic is testable
/// without a server.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn connect(&self, url: &Url) -> Result<Connection, TelemetryError>;
}

/// Production transport over tokio-tungstenite.
///
/// Two pump tasks per connection: one serializing outbound frames, one
/// parsing inbound text messages. Unparseable frames are logged and
/// skipped — a buggy broadcast must not kill the session channel.
#[derive(Clone, Copy, Debug, Default)]
pub struct WsTransport;

impl WsTransport {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WsTransport {
    async fn connect(&self, url: &Url) -> Result<Connection, TelemetryError> {
        let (socket, _response) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| TelemetryError::Connect(e.to_string()))?;
        let (mut sink, mut stream) = socket.split();

        let (out_tx, mut out_rx) = mpsc::channel::<ClientFrame>(32);
        let (in_tx, in_rx) = mpsc::channel::<ServerFrame>(32);

        tokio::spawn(async move {
            while let Some(frame) = out_rx.recv().await {
                let text = match frame.to_text() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "unserializable telemetry frame dropped");
                        continue;
                    }
                };
                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            let _ = sink.close().await;
        });

        tokio::spawn(async move {
            while let Some(message) = stream.next().await {
                match message {
                    Ok(Message::Text(text)) => match ServerFrame::parse(&text) {
                        Ok(frame) => {
                            if in_tx.send(frame).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => debug!(error = %e, "skipping malformed server frame"),
                    },
                    Ok(Message::Close(_)) | Err(_) => break,
                    // Pings are answered by tungstenite itself.
                    Ok(_) => {}
                }
            }
        });

        Ok(Connection {
            outbound: out_tx,
            inbound: in_rx,
        })
    }
}
