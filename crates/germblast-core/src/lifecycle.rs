//! Connection lifecycle: join, dispatch, and leave.
//!
//! These functions are what a transport calls for each connection. They
//! combine registry updates with session calls. Locks are only ever
//! taken session first, then registry: the registry never locks a
//! session, so a registry update made while a session is locked cannot
//! deadlock. A session's mutex is held for the whole of one event so the
//! screen and gun of a pair never interleave, and gun join and leave
//! update the session and the registry under that same mutex.

use germblast_store::GameStore;
use germblast_types::{ConnectionId, DeviceRole, GameType, SessionToken, UserId};
use tracing::{debug, warn};

use crate::error::SessionError;
use crate::protocol::Inbound;
use crate::registry::SessionRegistry;
use crate::transport::ConnectionHandle;

/// Register a screen, open its session, and greet it.
///
/// On failure nothing stays registered.
pub async fn connect_screen<S: GameStore>(
    registry: &SessionRegistry<S>,
    screen: ConnectionHandle,
    user_id: UserId,
    game_type: GameType,
) -> Result<SessionToken, SessionError> {
    let (token, session) = registry.create_session(screen, user_id, game_type).await?;

    let greeted = session.lock().await.screen_joined().await;
    if let Err(e) = greeted {
        if let Some(session) = registry.destroy(&token).await {
            session.lock().await.close();
        }
        return Err(e);
    }
    Ok(token)
}

/// Attach a gun to the session holding `token`.
///
/// The session stays locked while the registry slot is claimed and the
/// gun is attached, so a gun leaving the same session cannot be seen
/// half gone. On failure the gun is left unregistered and the caller
/// should close the connection.
pub async fn connect_gun<S: GameStore>(
    registry: &SessionRegistry<S>,
    gun: ConnectionHandle,
    token: &SessionToken,
) -> Result<(), SessionError> {
    let gun_id = gun.id();
    let Some(shared) = registry.resolve_by_token(token).await else {
        return Err(SessionError::UnknownToken {
            token: token.clone(),
        });
    };

    let mut session = shared.lock().await;
    registry
        .attach_connection(token, gun_id, DeviceRole::Gun)
        .await?;

    if let Err(e) = session.attach_gun(gun).await {
        registry.detach_connection(gun_id).await;
        return Err(e);
    }
    Ok(())
}

/// Decode one text frame from `connection_id` and hand it to its session.
///
/// Unknown connections and undecodable frames are dropped. Handler
/// failures are logged and abort only the event that caused them.
pub async fn dispatch<S: GameStore>(
    registry: &SessionRegistry<S>,
    connection_id: ConnectionId,
    text: &str,
) {
    let Some(event) = Inbound::parse(text) else {
        debug!(%connection_id, "Dropped undecodable frame");
        return;
    };
    let Some(attachment) = registry.resolve_by_connection(connection_id).await else {
        debug!(%connection_id, event = event.name(), "Dropped frame from unregistered connection");
        return;
    };

    let name = event.name();
    let result = attachment.session.lock().await.handle(event).await;
    if let Err(e) = result {
        warn!(
            token = %attachment.token,
            role = %attachment.role,
            event = name,
            error = %e,
            "Event handler failed"
        );
    }
}

/// Handle a connection going away.
///
/// A screen leaving destroys its session and closes the gun; a gun
/// leaving only frees the session's gun slot.
pub async fn disconnect<S: GameStore>(registry: &SessionRegistry<S>, connection_id: ConnectionId) {
    let Some(attachment) = registry.resolve_by_connection(connection_id).await else {
        return;
    };

    match attachment.role {
        DeviceRole::Screen => {
            if let Some(session) = registry.destroy(&attachment.token).await {
                session.lock().await.close();
            }
        }
        DeviceRole::Gun => {
            let mut session = attachment.session.lock().await;
            session.detach_gun(connection_id);
            registry.detach_connection(connection_id).await;
        }
    }
}
