//! Type-safe identifier wrappers.
//!
//! Entity identifiers wrap a [`Uuid`] (v7, time-ordered) so a game id can
//! never be passed where a connection id is expected. Session tokens are
//! issued by the store as opaque strings and get their own newtype.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a player account (owned by the store).
    UserId
}

define_id! {
    /// Unique identifier for a persisted game row.
    GameId
}

define_id! {
    /// Unique identifier for a spawned microbe.
    MicrobeId
}

define_id! {
    /// Unique identifier for one live transport connection.
    ConnectionId
}

/// Opaque pairing token that identifies a session for its whole lifetime.
///
/// The screen device receives it on connect and hands it to the gun
/// device (usually via a QR code), which presents it when joining.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Borrow the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for SessionToken {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for SessionToken {
    fn from(token: &str) -> Self {
        Self(token.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let game = GameId::new();
        let conn = ConnectionId::new();
        assert_ne!(game.into_inner(), Uuid::nil());
        assert_ne!(conn.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = MicrobeId::new();
        let json = serde_json::to_string(&id).ok();
        assert_eq!(json, Some(format!("\"{}\"", id.0)));
    }

    #[test]
    fn session_token_is_transparent() {
        let token = SessionToken::from("abc123");
        let json = serde_json::to_string(&token).ok();
        assert_eq!(json.as_deref(), Some("\"abc123\""));
        assert_eq!(token.to_string(), "abc123");
    }
}
