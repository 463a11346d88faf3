//! Outbound side of a device connection.
//!
//! Sessions never write to sockets. Each connection owns a bounded
//! channel drained by its writer task; a [`ConnectionHandle`] is the
//! sending half plus the connection's identity.

use germblast_types::{ConnectionId, DeviceRole};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::protocol::envelope;

/// Frames queued per connection before sends start failing.
pub const OUTBOUND_CAPACITY: usize = 256;

/// A frame queued for a connection's writer task.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    /// A framed JSON event.
    Event(Value),
    /// Close the socket and stop writing.
    Close,
}

/// Sending half of one device connection.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    role: DeviceRole,
    tx: mpsc::Sender<Outbound>,
}

impl ConnectionHandle {
    /// Wrap the sending half of a connection's outbound channel.
    pub const fn new(id: ConnectionId, role: DeviceRole, tx: mpsc::Sender<Outbound>) -> Self {
        Self { id, role, tx }
    }

    /// Create a handle and the receiver its writer task drains.
    pub fn channel(role: DeviceRole) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_CAPACITY);
        (Self::new(ConnectionId::new(), role, tx), rx)
    }

    /// Connection identifier.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Role of the device on the other end.
    pub const fn role(&self) -> DeviceRole {
        self.role
    }

    /// Queue `payload` as event `name`.
    ///
    /// Delivery is best effort: a closed or saturated connection drops
    /// the frame and the failure is only logged.
    pub fn emit<T: Serialize>(&self, name: &str, payload: &T) {
        match serde_json::to_value(payload) {
            Ok(value) => self.send(Outbound::Event(envelope(name, value))),
            Err(e) => tracing::warn!(event = name, error = %e, "Failed to serialize payload"),
        }
    }

    /// Queue an already-built frame, applying the envelope rule.
    pub fn emit_value(&self, name: &str, payload: Value) {
        self.send(Outbound::Event(envelope(name, payload)));
    }

    /// Ask the writer task to close the socket.
    pub fn close(&self) {
        self.send(Outbound::Close);
    }

    fn send(&self, frame: Outbound) {
        if let Err(e) = self.tx.try_send(frame) {
            tracing::debug!(
                connection_id = %self.id,
                role = %self.role,
                error = %e,
                "Dropped outbound frame"
            );
        }
    }
}
