//! Integration tests for connection join, dispatch, and leave.
//!
//! Connections are plain outbound channels and inbound frames are JSON
//! strings, exactly what the `WebSocket` layer hands over.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use germblast_core::lifecycle::{connect_gun, connect_screen, disconnect, dispatch};
use germblast_core::{ConnectionHandle, Outbound, SessionError, SessionRegistry, SessionSettings, SessionState};
use germblast_store::{GameStore, MemoryStore};
use germblast_types::{DeviceRole, GameType, SessionToken, UserId};
use serde_json::{Value, json};
use tokio::sync::mpsc::Receiver;

fn registry() -> SessionRegistry<MemoryStore> {
    SessionRegistry::new(Arc::new(MemoryStore::new()), SessionSettings::default())
}

fn events(rx: &mut Receiver<Outbound>) -> Vec<Value> {
    let mut frames = Vec::new();
    while let Ok(frame) = rx.try_recv() {
        if let Outbound::Event(value) = frame {
            frames.push(value);
        }
    }
    frames
}

fn names(frames: &[Value]) -> Vec<&str> {
    frames
        .iter()
        .filter_map(|f| f["event"].as_str())
        .collect()
}

#[tokio::test]
async fn screen_and_gun_pair_through_token() {
    let registry = registry();
    let (screen, mut screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);

    let token = connect_screen(&registry, screen, UserId::new(), GameType::Gun)
        .await
        .unwrap();
    let greeting = events(&mut screen_rx);
    assert_eq!(names(&greeting), vec!["screen:connected"]);
    assert_eq!(greeting[0]["token"], token.as_str());

    let (gun, _gun_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    connect_gun(&registry, gun, &token).await.unwrap();
    assert_eq!(names(&events(&mut screen_rx)), vec!["gun:connected"]);

    let session = registry.resolve_by_token(&token).await.unwrap();
    assert_eq!(session.lock().await.state(), SessionState::Paired);
}

#[tokio::test]
async fn gun_with_unknown_token_is_rejected() {
    let registry = registry();
    let (gun, _gun_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let gun_id = gun.id();

    let result = connect_gun(&registry, gun, &SessionToken::from("bogus")).await;
    assert!(matches!(result, Err(SessionError::UnknownToken { .. })));
    assert!(registry.resolve_by_connection(gun_id).await.is_none());
}

#[tokio::test]
async fn second_gun_is_rejected_and_unregistered() {
    let registry = registry();
    let (screen, _screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);
    let token = connect_screen(&registry, screen, UserId::new(), GameType::Gun)
        .await
        .unwrap();

    let (first, _first_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    connect_gun(&registry, first, &token).await.unwrap();

    let (second, _second_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let second_id = second.id();
    let result = connect_gun(&registry, second, &token).await;
    assert!(matches!(result, Err(SessionError::GunAlreadyAttached { .. })));
    assert!(registry.resolve_by_connection(second_id).await.is_none());
}

#[tokio::test]
async fn dispatch_routes_gun_frames_to_screen() {
    let registry = registry();
    let (screen, mut screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);
    let token = connect_screen(&registry, screen, UserId::new(), GameType::Gun)
        .await
        .unwrap();
    let (gun, _gun_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let gun_id = gun.id();
    connect_gun(&registry, gun, &token).await.unwrap();
    events(&mut screen_rx);

    dispatch(&registry, gun_id, r#"{"event":"gun:move","x":0.5,"y":0.5}"#).await;
    dispatch(&registry, gun_id, "garbage").await;
    dispatch(&registry, gun_id, r#"{"event":"gun:unknown"}"#).await;

    let frames = events(&mut screen_rx);
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0]["event"], "gun:move");
    assert_eq!(frames[0]["x"], 0.5);
}

#[tokio::test]
async fn screen_runs_a_game_over_text_frames() {
    let registry = registry();
    let (screen, mut screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);
    let screen_id = screen.id();
    connect_screen(&registry, screen, UserId::new(), GameType::Mobile)
        .await
        .unwrap();
    events(&mut screen_rx);

    dispatch(&registry, screen_id, r#"{"event":"screen:game_start"}"#).await;
    let started = events(&mut screen_rx);
    assert_eq!(names(&started), vec!["screen:game_started"]);
    assert_eq!(started[0]["microbes"].as_array().unwrap().len(), 4);

    dispatch(&registry, screen_id, r#"{"event":"screen:game_stop","score":0}"#).await;
    let stopped = events(&mut screen_rx);
    assert_eq!(names(&stopped), vec!["screen:game_stopped"]);
    assert_eq!(stopped[0]["force"], false);
}

#[tokio::test]
async fn gun_leaving_keeps_session() {
    let registry = registry();
    let (screen, mut screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);
    let token = connect_screen(&registry, screen, UserId::new(), GameType::Gun)
        .await
        .unwrap();
    let (gun, _gun_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let gun_id = gun.id();
    connect_gun(&registry, gun, &token).await.unwrap();
    events(&mut screen_rx);

    disconnect(&registry, gun_id).await;

    assert_eq!(names(&events(&mut screen_rx)), vec!["gun:disconnected"]);
    assert!(registry.resolve_by_connection(gun_id).await.is_none());
    let session = registry.resolve_by_token(&token).await.unwrap();
    assert_eq!(session.lock().await.state(), SessionState::Created);

    // A new gun can pair with the same token.
    let (again, _again_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    connect_gun(&registry, again, &token).await.unwrap();
}

#[tokio::test]
async fn screen_leaving_tears_everything_down() {
    let registry = registry();
    let (screen, _screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);
    let screen_id = screen.id();
    let token = connect_screen(&registry, screen, UserId::new(), GameType::Gun)
        .await
        .unwrap();
    let (gun, mut gun_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let gun_id = gun.id();
    connect_gun(&registry, gun, &token).await.unwrap();

    disconnect(&registry, screen_id).await;

    assert_eq!(gun_rx.try_recv().ok(), Some(Outbound::Close));
    assert!(registry.resolve_by_token(&token).await.is_none());
    assert!(registry.resolve_by_connection(screen_id).await.is_none());
    assert!(registry.resolve_by_connection(gun_id).await.is_none());
    assert_eq!(registry.session_count().await, 0);

    // Late frames and a late gun disconnect are harmless.
    dispatch(&registry, gun_id, r#"{"event":"gun:move"}"#).await;
    disconnect(&registry, gun_id).await;
}

#[tokio::test]
async fn unknown_connection_disconnect_is_noop() {
    let registry = registry();
    let (stray, _rx) = ConnectionHandle::channel(DeviceRole::Screen);
    disconnect(&registry, stray.id()).await;
    assert_eq!(registry.session_count().await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn gun_handoff_happens_under_the_session_lock() {
    let registry = Arc::new(registry());
    let (screen, _screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);
    let token = connect_screen(&registry, screen, UserId::new(), GameType::Gun)
        .await
        .unwrap();
    let (old_gun, _old_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let old_id = old_gun.id();
    connect_gun(&registry, old_gun, &token).await.unwrap();

    let session = registry.resolve_by_token(&token).await.unwrap();
    let guard = session.lock().await;

    let leaving = tokio::spawn({
        let registry = Arc::clone(&registry);
        async move { disconnect(&registry, old_id).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    // The old gun keeps its registry slot until the session lets it go.
    assert!(registry.resolve_by_connection(old_id).await.is_some());

    let (new_gun, _new_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let new_id = new_gun.id();
    let joining = tokio::spawn({
        let registry = Arc::clone(&registry);
        let token = token.clone();
        async move { connect_gun(&registry, new_gun, &token).await }
    });
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(registry.resolve_by_connection(new_id).await.is_none());

    drop(guard);
    leaving.await.unwrap();
    joining.await.unwrap().unwrap();

    assert_eq!(session.lock().await.gun_id(), Some(new_id));
    assert_eq!(session.lock().await.state(), SessionState::Paired);
    assert!(registry.resolve_by_connection(old_id).await.is_none());
    let attachment = registry.resolve_by_connection(new_id).await.unwrap();
    assert_eq!(attachment.role, DeviceRole::Gun);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shots_from_both_devices_are_serialized() {
    let registry = Arc::new(registry());
    let (screen, mut screen_rx) = ConnectionHandle::channel(DeviceRole::Screen);
    let screen_id = screen.id();
    let token = connect_screen(&registry, screen, UserId::new(), GameType::Gun)
        .await
        .unwrap();
    let (gun, _gun_rx) = ConnectionHandle::channel(DeviceRole::Gun);
    let gun_id = gun.id();
    connect_gun(&registry, gun, &token).await.unwrap();
    events(&mut screen_rx);

    dispatch(&registry, screen_id, r#"{"event":"screen:game_start"}"#).await;
    let started = events(&mut screen_rx);
    let targets: Vec<(f64, f64)> = started[0]["microbes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| (m["x"].as_f64().unwrap(), m["y"].as_f64().unwrap()))
        .collect();
    assert!(!targets.is_empty());

    // Every target is shot once from each device at the same time.
    let mut shots = Vec::new();
    for &(x, y) in &targets {
        for connection_id in [screen_id, gun_id] {
            let registry = Arc::clone(&registry);
            let frame = json!({ "event": "screen:shoot", "x": x, "y": y }).to_string();
            shots.push(tokio::spawn(async move {
                dispatch(&registry, connection_id, &frame).await;
            }));
        }
    }
    let shot_count = shots.len();
    for shot in shots {
        shot.await.unwrap();
    }

    let killed: Vec<String> = events(&mut screen_rx)
        .iter()
        .filter(|f| f["event"] == "screen:killed")
        .flat_map(|f| f["killed"].as_array().unwrap().clone())
        .map(|id| id.as_str().unwrap().to_owned())
        .collect();
    let unique: HashSet<&String> = killed.iter().collect();
    assert!(!killed.is_empty());
    assert_eq!(unique.len(), killed.len());
    assert!(killed.len() <= targets.len());

    let session = registry.resolve_by_token(&token).await.unwrap();
    let game_id = session.lock().await.game().unwrap().id;
    let game = registry.store().get_game(game_id).await.unwrap();
    assert_eq!(usize::try_from(game.score).unwrap(), killed.len());
    assert_eq!(usize::try_from(game.shoot_count).unwrap(), shot_count);
}
