//! The signed-in user, as handed over by the external auth service.
//!
//! Credential exchange happens elsewhere. This module only remembers the
//! outcome (display name, role, bearer token) under the `session` key so
//! later invocations can call the API on the user's behalf.

use std::sync::Arc;

use corner_store_core::Role;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the serialized session.
pub const SESSION_KEY: &str = "session";

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    #[serde(default)]
    pub role: Role,
}

impl User {
    #[must_use]
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }

    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A user together with the bearer token the API accepts for them.
#[derive(Clone)]
pub struct Session {
    pub user: User,
    pub token: SecretString,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// On-disk shape of a session. The token is only exposed here.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    name: String,
    #[serde(default)]
    role: Role,
    token: String,
}

/// Reads and writes the persisted session.
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    /// The persisted session, if one exists and is well formed.
    ///
    /// A blank name or token counts as signed out.
    #[must_use]
    pub fn load(&self) -> Option<Session> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read stored session");
                return None;
            }
        };

        let stored: StoredSession = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Ignoring malformed stored session");
                return None;
            }
        };

        if stored.name.trim().is_empty() || stored.token.trim().is_empty() {
            warn!("Ignoring stored session without name or token");
            return None;
        }

        Some(Session {
            user: User::new(stored.name, stored.role),
            token: SecretString::from(stored.token),
        })
    }

    /// Persist `session`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub fn save(&self, session: &Session) -> Result<(), StorageError> {
        let stored = StoredSession {
            name: session.user.name.clone(),
            role: session.user.role,
            token: session.token.expose_secret().to_string(),
        };
        let payload = serde_json::to_string(&stored).map_err(|source| StorageError::Serialize {
            key: SESSION_KEY.to_string(),
            source,
        })?;
        self.storage.set(SESSION_KEY, &payload)?;
        debug!(user = %session.user.name, role = %session.user.role, "Session saved");
        Ok(())
    }

    /// Forget the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored session cannot be deleted.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(SESSION_KEY)?;
        debug!("Session cleared");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn session(name: &str, role: Role) -> Session {
        Session {
            user: User::new(name, role),
            token: SecretString::from("tok_abc"),
        }
    }

    #[test]
    fn test_save_then_load() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        store.save(&session("Ada", Role::Admin)).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.user, User::new("Ada", Role::Admin));
        assert_eq!(loaded.token.expose_secret(), "tok_abc");
    }

    #[test]
    fn test_clear_signs_out() {
        let store = SessionStore::new(Arc::new(MemoryStore::new()));
        store.save(&session("Ada", Role::Customer)).unwrap();
        store.clear().unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn test_malformed_session_is_ignored() {
        let storage = Arc::new(MemoryStore::with_value(SESSION_KEY, r#"{"name":"Ada"}"#));
        assert!(SessionStore::new(storage).load().is_none());

        let storage = Arc::new(MemoryStore::with_value(
            SESSION_KEY,
            r#"{"name":" ","token":"t"}"#,
        ));
        assert!(SessionStore::new(storage).load().is_none());
    }

    #[test]
    fn test_role_defaults_to_customer() {
        let storage = Arc::new(MemoryStore::with_value(
            SESSION_KEY,
            r#"{"name":"Bo","token":"t"}"#,
        ));
        let loaded = SessionStore::new(storage).load().unwrap();
        assert!(!loaded.user.is_admin());
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", session("Ada", Role::Admin));
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("tok_abc"));
    }
}
