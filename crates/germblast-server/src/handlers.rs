//! Plain HTTP endpoint handlers.
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Liveness plus the live session count |

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use germblast_store::GameStore;
use serde_json::{Value, json};

use crate::state::AppState;

/// Report liveness and the number of live sessions.
pub async fn health<S: GameStore>(State(state): State<Arc<AppState<S>>>) -> Json<Value> {
    let sessions = state.registry.session_count().await;
    Json(json!({
        "status": "ok",
        "sessions": sessions,
    }))
}
