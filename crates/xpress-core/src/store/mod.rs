// ── Application store ──
//
// Single owner of cross-screen state. Consumers read snapshots or subscribe
// to a `watch` channel; writes only happen through `Store::dispatch`, which
// runs the reducer and then mirrors auth changes into durable storage.

mod session;
mod state;

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;
use tracing::{debug, info, warn};

pub use session::{MemorySessionStore, PersistedSession, SESSION_LIFETIME_MS, SessionStore};
pub use state::{Action, AppState, AuthState, ProductsState, RequestStatus, reduce};

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Reducer-driven state container with change notification.
pub struct Store {
    state: watch::Sender<AppState>,
    sessions: Arc<dyn SessionStore>,
}

impl Store {
    /// An empty store (signed out) backed by `sessions`.
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(AppState::default());
        Self { state, sessions }
    }

    /// Build a store and restore the saved session if it is still valid
    /// at `now_ms`. An expired session is treated as absent and removed
    /// from storage.
    pub fn restore(sessions: Arc<dyn SessionStore>, now_ms: i64) -> Self {
        let store = Self::new(sessions);

        let saved = match store.sessions.load() {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "could not read saved session");
                None
            }
        };

        match saved {
            Some(saved) if !saved.is_expired_at(now_ms) => {
                debug!(expires_at_ms = saved.auth_expiry, "restored saved session");
                store.state.send_modify(|state| {
                    reduce(
                        state,
                        Action::SetCredentials {
                            token: SecretString::from(saved.auth_token),
                            user: saved.auth_user,
                            expires_at_ms: saved.auth_expiry,
                        },
                    );
                });
            }
            Some(_) => {
                info!("saved session expired; clearing it");
                if let Err(e) = store.sessions.clear() {
                    warn!(error = %e, "could not clear expired session");
                }
            }
            None => {}
        }

        store
    }

    /// Run `action` through the reducer and notify subscribers.
    pub fn dispatch(&self, action: Action) {
        debug!(action = action.name(), "dispatch");
        let persist = match &action {
            Action::LoginFulfilled { .. } | Action::SetCredentials { .. } => Persist::Save,
            Action::Logout => Persist::Clear,
            _ => Persist::Nothing,
        };

        self.state.send_modify(|state| reduce(state, action));

        match persist {
            Persist::Save => self.save_session(),
            Persist::Clear => {
                if let Err(e) = self.sessions.clear() {
                    warn!(error = %e, "could not clear saved session");
                }
            }
            Persist::Nothing => {}
        }
    }

    /// Snapshot of the whole state.
    pub fn state(&self) -> AppState {
        self.state.borrow().clone()
    }

    /// Read the state in place without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<AppState> {
        self.state.subscribe()
    }

    /// The state as a `Stream`, starting with the current value.
    pub fn stream(&self) -> WatchStream<AppState> {
        WatchStream::new(self.state.subscribe())
    }

    fn save_session(&self) {
        let saved = self.with_state(|state| {
            let auth = &state.auth;
            Some(PersistedSession {
                auth_token: auth.token.as_ref()?.expose_secret().to_owned(),
                auth_expiry: auth.expires_at_ms?,
                auth_user: auth.user.clone(),
            })
        });
        if let Some(saved) = saved {
            if let Err(e) = self.sessions.save(&saved) {
                warn!(error = %e, "could not persist session");
            }
        }
    }
}

enum Persist {
    Save,
    Clear,
    Nothing,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::SessionUser;

    const NOW: i64 = 1_700_000_000_000;

    fn saved(expiry: i64) -> PersistedSession {
        PersistedSession {
            auth_token: "tok".into(),
            auth_expiry: expiry,
            auth_user: Some(SessionUser {
                uid: "u1".into(),
                email: None,
                role: "admin".into(),
            }),
        }
    }

    #[test]
    fn expired_session_is_absent_and_cleared() {
        let sessions = Arc::new(MemorySessionStore::with_session(saved(NOW - 1000)));
        let store = Store::restore(sessions.clone(), NOW);

        assert!(!store.state().auth.is_authenticated_at(NOW));
        assert_eq!(sessions.load().unwrap(), None);
    }

    #[test]
    fn live_session_is_restored() {
        let sessions = Arc::new(MemorySessionStore::with_session(saved(NOW + 1000)));
        let store = Store::restore(sessions, NOW);

        let auth = store.state().auth;
        assert!(auth.is_authenticated_at(NOW));
        assert_eq!(auth.user.map(|u| u.uid), Some("u1".into()));
    }

    #[test]
    fn login_and_logout_write_through() {
        let sessions = Arc::new(MemorySessionStore::new());
        let store = Store::new(sessions.clone());

        store.dispatch(Action::LoginFulfilled {
            token: SecretString::from("tok"),
            user: saved(0).auth_user.unwrap(),
            expires_at_ms: NOW + SESSION_LIFETIME_MS,
        });
        assert_eq!(sessions.load().unwrap(), Some(saved(NOW + SESSION_LIFETIME_MS)));

        store.dispatch(Action::Logout);
        assert_eq!(sessions.load().unwrap(), None);
    }

    #[test]
    fn saved_session_uses_browser_key_names() {
        let json = serde_json::to_value(saved(42)).unwrap();
        assert_eq!(json["authToken"], "tok");
        assert_eq!(json["authExpiry"], 42);
        assert_eq!(json["authUser"]["role"], "admin");
    }

    #[tokio::test]
    async fn subscribers_see_dispatches() {
        let store = Store::new(Arc::new(MemorySessionStore::new()));
        let mut rx = store.subscribe();

        store.dispatch(Action::ProductsFetchPending);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().products.status, RequestStatus::Loading);
    }
}
