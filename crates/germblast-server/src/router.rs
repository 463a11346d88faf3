//! Axum router construction for the session server.
//!
//! Assembles the `WebSocket` endpoint and the health check into a single
//! [`Router`] with CORS and request tracing enabled.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use germblast_store::GameStore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /ws` -- device `WebSocket` (screen or gun, chosen by query)
/// - `GET /health` -- liveness and session count
///
/// Screens are served from other origins, so CORS allows any origin.
pub fn build_router<S: GameStore>(state: Arc<AppState<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws::ws_connect::<S>))
        .route("/health", get(handlers::health::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
