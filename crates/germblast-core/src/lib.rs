//! Session coordination for the Germblast session server.
//!
//! A session pairs one screen device with at most one gun device. This
//! crate holds the session state machine, the registry that finds
//! sessions by token or connection, the wire protocol, and the
//! configuration loader.
//!
//! # Architecture
//!
//! ```text
//! transport (ws)
//!     |
//!     +-- lifecycle::connect_screen / connect_gun / dispatch / disconnect
//!             |
//!             +-- SessionRegistry (token -> session, connection -> token)
//!             |
//!             +-- Session (per-pair mutex)
//!                     |-- SpawnEngine   (germblast-world)
//!                     |-- GameStore     (germblast-store)
//!                     +-- ConnectionHandle -> outbound channel
//! ```
//!
//! # Modules
//!
//! - [`config`] -- `germblast-config.yaml` loader and typed sections
//! - [`error`] -- Session and registry errors
//! - [`lifecycle`] -- Join, dispatch, and leave for one connection
//! - [`protocol`] -- Inbound decoding and outbound framing
//! - [`registry`] -- [`SessionRegistry`]
//! - [`session`] -- [`Session`] state machine
//! - [`transport`] -- [`ConnectionHandle`] and outbound frames

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod protocol;
pub mod registry;
pub mod session;
pub mod transport;

// Re-export primary types at crate root.
pub use config::{AppConfig, ConfigError, GameConfig, ServerConfig, StickySessionConfig};
pub use error::SessionError;
pub use protocol::{Inbound, envelope};
pub use registry::{Attachment, SessionRegistry, SharedSession};
pub use session::{Session, SessionSettings, SessionState};
pub use transport::{ConnectionHandle, Outbound};
