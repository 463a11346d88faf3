//! `WebSocket` session server for Germblast.
//!
//! This crate exposes the session coordinator over HTTP:
//!
//! - **`WebSocket` endpoint** (`/ws`) where screen and gun devices join a
//!   session and exchange `{"event": ..., ...}` text frames
//! - **Health endpoint** (`/health`) reporting liveness and the number
//!   of live sessions
//!
//! # Architecture
//!
//! Every socket gets its own task. The task owns the socket and an
//! outbound channel; inbound frames go through
//! [`germblast_core::lifecycle::dispatch`], and frames a session emits
//! for this device arrive on the channel. The task never touches session
//! state directly.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::{ApiError, AppError};
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
