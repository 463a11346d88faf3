//! Error types for session handling.
//!
//! None of these reach a device: the connection layer logs them and
//! either drops the offending event or closes the connection.

use germblast_store::StoreError;
use germblast_types::{ConnectionId, SessionToken};
use germblast_world::WorldError;

/// Errors that can occur while handling a session event or registering
/// a connection.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A store call failed; the event was aborted before any emission.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The spawn engine could not be built.
    #[error("world error: {0}")]
    World(#[from] WorldError),

    /// No session is registered under the token.
    #[error("unknown session token: {token}")]
    UnknownToken {
        /// The token that was presented.
        token: SessionToken,
    },

    /// The session already has a gun attached.
    #[error("session {token} already has a gun attached")]
    GunAlreadyAttached {
        /// The session's token.
        token: SessionToken,
    },

    /// The connection is already registered to a session.
    #[error("connection {connection_id} is already registered")]
    DuplicateConnection {
        /// The connection that was registered twice.
        connection_id: ConnectionId,
    },

    /// The session has been torn down.
    #[error("session {token} is closed")]
    Closed {
        /// The session's token.
        token: SessionToken,
    },
}
