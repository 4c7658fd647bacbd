#![forbid(unsafe_code)]

mod channel;
mod error;
mod transport;
mod wire;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use channel::{ConnectionState, TelemetryChannel, TelemetryOptions, TelemetrySession};
pub use error::{TelemetryError, TelemetryResult};
pub use transport::{Connection, Transport, WsTransport};
pub use wire::{ClientFrame, ServerFrame};
