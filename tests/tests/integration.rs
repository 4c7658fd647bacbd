//! All integration tests for theatron.
#![allow(clippy::unwrap_used)]

mod common;
mod persistence_cycle;
mod security_gate;
mod telemetry_channel;
mod watch_session;
