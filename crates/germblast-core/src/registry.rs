//! Token and connection lookup for live sessions.
//!
//! The registry is the only place sessions can be found from. It maps
//! each pairing token to its session and each attached connection back to
//! the token it belongs to. Both maps sit behind one `RwLock` that is
//! held only while they are read or updated; the registry never locks a
//! [`Session`] itself.

use std::collections::HashMap;
use std::sync::Arc;

use germblast_store::GameStore;
use germblast_types::{ConnectionId, DeviceRole, GameType, SessionToken, UserId};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::error::SessionError;
use crate::session::{Session, SessionSettings};
use crate::transport::ConnectionHandle;

/// A session shared between its connection tasks.
pub type SharedSession<S> = Arc<Mutex<Session<S>>>;

/// What a connection id resolves to.
#[derive(Debug)]
pub struct Attachment<S> {
    /// Token of the session the connection belongs to.
    pub token: SessionToken,
    /// Role the connection plays in it.
    pub role: DeviceRole,
    /// The session itself.
    pub session: SharedSession<S>,
}

struct Entry<S> {
    session: SharedSession<S>,
    screen: ConnectionId,
    gun: Option<ConnectionId>,
}

struct Maps<S> {
    by_token: HashMap<SessionToken, Entry<S>>,
    by_connection: HashMap<ConnectionId, (SessionToken, DeviceRole)>,
}

impl<S> Default for Maps<S> {
    fn default() -> Self {
        Self {
            by_token: HashMap::new(),
            by_connection: HashMap::new(),
        }
    }
}

/// Issues session tokens and resolves tokens and connections to sessions.
pub struct SessionRegistry<S> {
    store: Arc<S>,
    settings: Arc<SessionSettings>,
    maps: RwLock<Maps<S>>,
}

impl<S> core::fmt::Debug for SessionRegistry<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<S: GameStore> SessionRegistry<S> {
    /// Create an empty registry.
    pub fn new(store: Arc<S>, settings: SessionSettings) -> Self {
        Self {
            store,
            settings: Arc::new(settings),
            maps: RwLock::new(Maps::default()),
        }
    }

    /// The store sessions persist through.
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Settings handed to every session.
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.maps.read().await.by_token.len()
    }

    /// Register a new session for a screen connection.
    ///
    /// The token comes from the store; the store call happens before the
    /// map lock is taken.
    pub async fn create_session(
        &self,
        screen: ConnectionHandle,
        user_id: UserId,
        game_type: GameType,
    ) -> Result<(SessionToken, SharedSession<S>), SessionError> {
        let issued = self.store.save_token(user_id).await?;
        let token = SessionToken::from(issued.token);
        let screen_id = screen.id();

        let session = Arc::new(Mutex::new(Session::new(
            token.clone(),
            user_id,
            game_type,
            screen,
            Arc::clone(&self.store),
            Arc::clone(&self.settings),
        )));

        {
            let mut maps = self.maps.write().await;
            if maps.by_connection.contains_key(&screen_id) {
                return Err(SessionError::DuplicateConnection {
                    connection_id: screen_id,
                });
            }
            maps.by_connection
                .insert(screen_id, (token.clone(), DeviceRole::Screen));
            maps.by_token.insert(
                token.clone(),
                Entry {
                    session: Arc::clone(&session),
                    screen: screen_id,
                    gun: None,
                },
            );
        }

        info!(%token, %user_id, %game_type, connection_id = %screen_id, "Session created");
        Ok((token, session))
    }

    /// Look a session up by its token.
    pub async fn resolve_by_token(&self, token: &SessionToken) -> Option<SharedSession<S>> {
        self.maps
            .read()
            .await
            .by_token
            .get(token)
            .map(|entry| Arc::clone(&entry.session))
    }

    /// Look a session up by one of its connections.
    ///
    /// `None` is a normal answer: the connection may never have joined,
    /// or its session may already be gone.
    pub async fn resolve_by_connection(&self, connection_id: ConnectionId) -> Option<Attachment<S>> {
        let maps = self.maps.read().await;
        let (token, role) = maps.by_connection.get(&connection_id)?;
        let entry = maps.by_token.get(token)?;
        Some(Attachment {
            token: token.clone(),
            role: *role,
            session: Arc::clone(&entry.session),
        })
    }

    /// Map a gun connection to the session holding `token`.
    pub async fn attach_connection(
        &self,
        token: &SessionToken,
        connection_id: ConnectionId,
        role: DeviceRole,
    ) -> Result<SharedSession<S>, SessionError> {
        let mut maps = self.maps.write().await;
        if maps.by_connection.contains_key(&connection_id) {
            return Err(SessionError::DuplicateConnection { connection_id });
        }

        let Some(entry) = maps.by_token.get_mut(token) else {
            return Err(SessionError::UnknownToken {
                token: token.clone(),
            });
        };
        match role {
            DeviceRole::Gun if entry.gun.is_some() => {
                return Err(SessionError::GunAlreadyAttached {
                    token: token.clone(),
                });
            }
            DeviceRole::Gun => entry.gun = Some(connection_id),
            // A session is created with its screen; a second one cannot join.
            DeviceRole::Screen => {
                return Err(SessionError::DuplicateConnection {
                    connection_id: entry.screen,
                });
            }
        }
        let session = Arc::clone(&entry.session);
        maps.by_connection
            .insert(connection_id, (token.clone(), role));

        debug!(%token, %connection_id, %role, "Connection attached");
        Ok(session)
    }

    /// Remove one connection's mapping.
    ///
    /// Detaching a gun frees the session's gun slot. Detaching the screen
    /// only drops its mapping; use [`destroy`](Self::destroy) to remove
    /// the session.
    pub async fn detach_connection(&self, connection_id: ConnectionId) -> Option<Attachment<S>> {
        let mut maps = self.maps.write().await;
        let (token, role) = maps.by_connection.remove(&connection_id)?;
        let entry = maps.by_token.get_mut(&token)?;
        if role == DeviceRole::Gun && entry.gun == Some(connection_id) {
            entry.gun = None;
        }
        let session = Arc::clone(&entry.session);

        debug!(%token, %connection_id, %role, "Connection detached");
        Some(Attachment {
            token,
            role,
            session,
        })
    }

    /// Remove a session and every connection mapped to it.
    ///
    /// Safe to call when no gun ever joined, and when the session is
    /// already gone.
    pub async fn destroy(&self, token: &SessionToken) -> Option<SharedSession<S>> {
        let mut maps = self.maps.write().await;
        let entry = maps.by_token.remove(token)?;
        maps.by_connection.remove(&entry.screen);
        if let Some(gun) = entry.gun {
            maps.by_connection.remove(&gun);
        }

        info!(%token, "Session destroyed");
        Some(entry.session)
    }
}
