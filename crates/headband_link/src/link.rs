//! The device-link trait and link-level errors.

use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::sync::mpsc;

use telemetry_types::Notification;

use crate::control::ControlCommand;

/// Link-level failures. Only [`LinkError::HandshakeFailed`], raised after
/// the retry budget is spent, is surfaced to the user; everything else is
/// an intermediate cause.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("link is not connected")]
    NotConnected,
    #[error("control write rejected: {0:?}")]
    ControlRejected(ControlCommand),
    #[error("handshake failed after {attempts} attempts: {last}")]
    HandshakeFailed {
        attempts: u32,
        #[source]
        last: Box<LinkError>,
    },
}

/// Abstraction over the wireless transport.
///
/// Implementations deliver raw notification frames on the channel returned
/// by [`subscribe`](DeviceLink::subscribe); the session layer owns decode
/// and buffering. Mirrors the shape of a GATT client: connect, write the
/// control characteristic, subscribe to the data characteristics,
/// disconnect.
#[async_trait]
pub trait DeviceLink: Send + std::fmt::Debug {
    async fn connect(&mut self) -> Result<(), LinkError>;

    async fn write_control(&mut self, command: ControlCommand) -> Result<(), LinkError>;

    /// Subscribe to all data characteristics. Notifications arrive on the
    /// returned channel, one per frame, tagged with their receipt time.
    async fn subscribe(&mut self) -> Result<mpsc::Receiver<Notification>, LinkError>;

    async fn disconnect(&mut self) -> Result<(), LinkError>;

    fn is_connected(&self) -> bool;
}

/// Wall-clock seconds since the Unix epoch, as notification receipt times.
pub fn wall_clock_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
}
