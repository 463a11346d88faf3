//! `WebSocket` endpoint for screen and gun devices.
//!
//! Both devices connect to `GET /ws`. The query picks the role:
//!
//! - `?role=screen&user_id=<uuid>&game_type=<mouse|gun|mobile>` opens a
//!   new session and greets the screen with its pairing token.
//! - `?role=gun&token=<token>` pairs a gun with an existing session.
//!
//! Each socket is served by one task that alternates between draining
//! the connection's outbound channel and reading inbound text frames.
//! When the socket ends, the connection is removed from its session.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::{IntoResponse, Response};
use germblast_core::lifecycle::{connect_gun, connect_screen, disconnect, dispatch};
use germblast_core::{ConnectionHandle, Outbound};
use germblast_store::GameStore;
use germblast_types::{DeviceRole, GameType, SessionToken, UserId};
use serde::Deserialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// Raw query parameters of `GET /ws`.
#[derive(Debug, Deserialize)]
pub struct ConnectParams {
    /// Which device is connecting.
    pub role: DeviceRole,
    /// Owner of the new session (screen only).
    pub user_id: Option<Uuid>,
    /// Device class of the screen (screen only).
    pub game_type: Option<GameType>,
    /// Pairing token shown on the screen (gun only).
    pub token: Option<String>,
}

/// A validated connect request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectRequest {
    /// Open a new session.
    Screen {
        /// Owner of the session.
        user_id: UserId,
        /// Device class of the screen.
        game_type: GameType,
    },
    /// Join an existing session.
    Gun {
        /// Token of the session to join.
        token: SessionToken,
    },
}

impl ConnectRequest {
    /// Role of the connecting device.
    pub const fn role(&self) -> DeviceRole {
        match self {
            Self::Screen { .. } => DeviceRole::Screen,
            Self::Gun { .. } => DeviceRole::Gun,
        }
    }
}

impl TryFrom<ConnectParams> for ConnectRequest {
    type Error = ApiError;

    fn try_from(params: ConnectParams) -> Result<Self, Self::Error> {
        match params.role {
            DeviceRole::Screen => {
                let user_id = params
                    .user_id
                    .ok_or_else(|| ApiError::InvalidQuery(String::from("screen requires user_id")))?;
                let game_type = params.game_type.ok_or_else(|| {
                    ApiError::InvalidQuery(String::from("screen requires game_type"))
                })?;
                Ok(Self::Screen {
                    user_id: UserId::from(user_id),
                    game_type,
                })
            }
            DeviceRole::Gun => {
                let token = params
                    .token
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| ApiError::InvalidQuery(String::from("gun requires token")))?;
                Ok(Self::Gun {
                    token: SessionToken::from(token),
                })
            }
        }
    }
}

/// Validate the connect query and upgrade to a `WebSocket`.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_connect<S: GameStore>(
    Query(params): Query<ConnectParams>,
    State(state): State<Arc<AppState<S>>>,
    ws: WebSocketUpgrade,
) -> Response {
    let request = match ConnectRequest::try_from(params) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };
    ws.on_upgrade(move |socket| handle_ws(socket, state, request))
}

/// Join the session, pump frames both ways, then leave.
async fn handle_ws<S: GameStore>(
    mut socket: WebSocket,
    state: Arc<AppState<S>>,
    request: ConnectRequest,
) {
    let role = request.role();
    let (handle, mut outbound) = ConnectionHandle::channel(role);
    let connection_id = handle.id();

    let joined = match request {
        ConnectRequest::Screen { user_id, game_type } => {
            connect_screen(&state.registry, handle, user_id, game_type)
                .await
                .map(|token| info!(%token, %connection_id, "Screen connected"))
        }
        ConnectRequest::Gun { token } => connect_gun(&state.registry, handle, &token)
            .await
            .map(|()| info!(%token, %connection_id, "Gun connected")),
    };
    if let Err(e) = joined {
        warn!(%connection_id, %role, error = %e, "Connection rejected");
        let _ = socket.send(Message::Close(None)).await;
        return;
    }

    loop {
        tokio::select! {
            // Frames queued by the session for this device.
            frame = outbound.recv() => {
                match frame {
                    Some(Outbound::Event(value)) => {
                        let msg = Message::Text(value.to_string().into());
                        if socket.send(msg).await.is_err() {
                            debug!(%connection_id, "WebSocket client disconnected (send failed)");
                            break;
                        }
                    }
                    Some(Outbound::Close) | None => {
                        let _ = socket.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
            // Frames from the device.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        dispatch(&state.registry, connection_id, text.as_str()).await;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%connection_id, "WebSocket client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%connection_id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(%connection_id, "WebSocket error: {e}");
                        break;
                    }
                    _ => {
                        // Binary and pong frames carry nothing for us.
                    }
                }
            }
        }
    }

    disconnect(&state.registry, connection_id).await;
    info!(%connection_id, %role, "Connection closed");
}
