// ── Durable session storage ──
//
// The signed-in session survives restarts as three values: the bearer
// token, its absolute expiry and the user. Where they live is up to the
// `SessionStore` implementation; core ships an in-memory one and
// `xpress-config` a file-backed one.

use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::model::SessionUser;

/// Sessions last one hour from sign-in.
pub const SESSION_LIFETIME_MS: i64 = 60 * 60 * 1000;

/// On-disk shape of a saved session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub auth_token: String,
    /// Milliseconds since the epoch.
    pub auth_expiry: i64,
    #[serde(default)]
    pub auth_user: Option<SessionUser>,
}

impl PersistedSession {
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.auth_expiry <= now_ms
    }
}

/// Where sessions are kept between runs.
pub trait SessionStore: Send + Sync {
    /// The saved session, or `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<PersistedSession>, CoreError>;
    fn save(&self, session: &PersistedSession) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Process-local storage. Used by tests and one-shot commands that must
/// not touch disk.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<PersistedSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(session: PersistedSession) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, CoreError> {
        Ok(self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
