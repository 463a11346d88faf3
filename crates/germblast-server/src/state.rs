//! Shared application state for the session server.
//!
//! [`AppState`] wraps the [`SessionRegistry`] every connection task and
//! HTTP handler reaches sessions through.

use germblast_core::SessionRegistry;

/// State shared by all routes.
#[derive(Debug)]
pub struct AppState<S> {
    /// Live sessions.
    pub registry: SessionRegistry<S>,
}

impl<S> AppState<S> {
    /// Wrap a registry.
    pub const fn new(registry: SessionRegistry<S>) -> Self {
        Self { registry }
    }
}
