//! Integration tests for the session server routes.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Upgrades cannot complete this way, so the
//! `WebSocket` route is only exercised up to query validation.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use germblast_core::{ConnectionHandle, SessionRegistry, SessionSettings};
use germblast_server::router::build_router;
use germblast_server::state::AppState;
use germblast_store::MemoryStore;
use germblast_types::{DeviceRole, GameType, UserId};
use serde_json::Value;
use tower::ServiceExt;

fn make_test_state() -> Arc<AppState<MemoryStore>> {
    let registry = SessionRegistry::new(Arc::new(MemoryStore::new()), SessionSettings::default());
    Arc::new(AppState::new(registry))
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_reports_no_sessions() {
    let app = build_router(make_test_state());

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["sessions"], 0);
}

#[tokio::test]
async fn test_health_counts_live_sessions() {
    let state = make_test_state();
    let (screen, _rx) = ConnectionHandle::channel(DeviceRole::Screen);
    state
        .registry
        .create_session(screen, UserId::new(), GameType::Mouse)
        .await
        .unwrap();

    let app = build_router(Arc::clone(&state));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["sessions"], 1);
}

#[tokio::test]
async fn test_ws_rejects_unknown_role() {
    let app = build_router(make_test_state());

    let response = app
        .oneshot(
            Request::get("/ws?role=projector")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ws_rejects_malformed_user_id() {
    let app = build_router(make_test_state());

    let response = app
        .oneshot(
            Request::get("/ws?role=screen&user_id=not-a-uuid&game_type=mouse")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = build_router(make_test_state());

    let response = app
        .oneshot(
            Request::get("/ws?role=gun&token=abc")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_unknown_route_returns_404() {
    let app = build_router(make_test_state());

    let response = app
        .oneshot(Request::get("/api/sessions").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
