// ── Store slices and the reducer ──
//
// Two slices: `auth` (session + login lifecycle) and `products` (the cached
// catalog). Every change goes through `reduce(state, action)`; nothing else
// mutates an `AppState`.

use secrecy::SecretString;
use strum::Display;

use crate::model::{Product, Session, SessionUser};

/// Async lifecycle of a slice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

/// The auth slice.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub user: Option<SessionUser>,
    pub token: Option<SecretString>,
    /// Absolute expiry, milliseconds since the epoch.
    pub expires_at_ms: Option<i64>,
    pub status: RequestStatus,
    pub error: Option<String>,
}

impl AuthState {
    /// A token is present and its expiry lies after `now_ms`.
    pub fn is_authenticated_at(&self, now_ms: i64) -> bool {
        self.token.is_some() && self.expires_at_ms.is_some_and(|exp| exp > now_ms)
    }

    /// The live session at `now_ms`, if any.
    pub fn session_at(&self, now_ms: i64) -> Option<Session> {
        if !self.is_authenticated_at(now_ms) {
            return None;
        }
        Some(Session {
            token: self.token.clone()?,
            user: self.user.clone(),
            expires_at_ms: self.expires_at_ms?,
        })
    }

    fn clear(&mut self) {
        self.user = None;
        self.token = None;
        self.expires_at_ms = None;
    }
}

/// The products slice.
#[derive(Debug, Clone, Default)]
pub struct ProductsState {
    pub items: Vec<Product>,
    pub status: RequestStatus,
    pub error: Option<String>,
}

/// Everything the store owns.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub auth: AuthState,
    pub products: ProductsState,
}

/// State transitions. Async operations come as pending/fulfilled/rejected
/// triples; `SetCredentials` and `Logout` apply immediately.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Auth ─────────────────────────────────────────────────────────
    LoginPending,
    LoginFulfilled {
        token: SecretString,
        user: SessionUser,
        expires_at_ms: i64,
    },
    LoginRejected(String),
    SetCredentials {
        token: SecretString,
        user: Option<SessionUser>,
        expires_at_ms: i64,
    },
    Logout,

    // ── Products ─────────────────────────────────────────────────────
    ProductsFetchPending,
    ProductsFetchFulfilled(Vec<Product>),
    ProductsFetchRejected(String),
    ProductAddPending,
    /// The created product, when the backend echoes it.
    ProductAddFulfilled(Option<Product>),
    ProductAddRejected(String),
    ProductUpdatePending,
    ProductUpdateFulfilled(Option<Product>),
    ProductUpdateRejected(String),
    ProductDeletePending,
    ProductDeleteFulfilled {
        id: String,
    },
    ProductDeleteRejected(String),
}

impl Action {
    /// Short name for logging. Never includes payload data.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LoginPending => "auth/login/pending",
            Self::LoginFulfilled { .. } => "auth/login/fulfilled",
            Self::LoginRejected(_) => "auth/login/rejected",
            Self::SetCredentials { .. } => "auth/setCredentials",
            Self::Logout => "auth/logout",
            Self::ProductsFetchPending => "products/fetch/pending",
            Self::ProductsFetchFulfilled(_) => "products/fetch/fulfilled",
            Self::ProductsFetchRejected(_) => "products/fetch/rejected",
            Self::ProductAddPending => "products/add/pending",
            Self::ProductAddFulfilled(_) => "products/add/fulfilled",
            Self::ProductAddRejected(_) => "products/add/rejected",
            Self::ProductUpdatePending => "products/update/pending",
            Self::ProductUpdateFulfilled(_) => "products/update/fulfilled",
            Self::ProductUpdateRejected(_) => "products/update/rejected",
            Self::ProductDeletePending => "products/delete/pending",
            Self::ProductDeleteFulfilled { .. } => "products/delete/fulfilled",
            Self::ProductDeleteRejected(_) => "products/delete/rejected",
        }
    }
}

/// Apply `action` to `state`.
pub fn reduce(state: &mut AppState, action: Action) {
    match action {
        Action::LoginPending => {
            state.auth.status = RequestStatus::Loading;
            state.auth.error = None;
        }
        Action::LoginFulfilled {
            token,
            user,
            expires_at_ms,
        } => {
            state.auth.token = Some(token);
            state.auth.user = Some(user);
            state.auth.expires_at_ms = Some(expires_at_ms);
            state.auth.status = RequestStatus::Succeeded;
            state.auth.error = None;
        }
        Action::LoginRejected(message) => {
            state.auth.clear();
            state.auth.status = RequestStatus::Failed;
            state.auth.error = Some(message);
        }
        Action::SetCredentials {
            token,
            user,
            expires_at_ms,
        } => {
            state.auth.token = Some(token);
            state.auth.user = user;
            state.auth.expires_at_ms = Some(expires_at_ms);
        }
        Action::Logout => {
            state.auth = AuthState::default();
        }

        Action::ProductsFetchPending
        | Action::ProductAddPending
        | Action::ProductUpdatePending
        | Action::ProductDeletePending => {
            state.products.status = RequestStatus::Loading;
            state.products.error = None;
        }
        Action::ProductsFetchRejected(message)
        | Action::ProductAddRejected(message)
        | Action::ProductUpdateRejected(message)
        | Action::ProductDeleteRejected(message) => {
            state.products.status = RequestStatus::Failed;
            state.products.error = Some(message);
        }
        Action::ProductsFetchFulfilled(items) => {
            state.products.items = items;
            state.products.status = RequestStatus::Succeeded;
        }
        Action::ProductAddFulfilled(created) => {
            state.products.items.extend(created);
            state.products.status = RequestStatus::Succeeded;
        }
        Action::ProductUpdateFulfilled(updated) => {
            if let Some(updated) = updated {
                if let Some(slot) = state.products.items.iter_mut().find(|p| p.id == updated.id) {
                    *slot = updated;
                }
            }
            state.products.status = RequestStatus::Succeeded;
        }
        Action::ProductDeleteFulfilled { id } => {
            state.products.items.retain(|p| p.id != id);
            state.products.status = RequestStatus::Succeeded;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::DisplayFlags;

    fn product(id: &str, name: &str) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price: 10.0,
            stock: 3,
            vendor_id: None,
            vendor_name: None,
            category_id: None,
            brand: None,
            part_number: None,
            description: String::new(),
            condition: "new".into(),
            specifications: Vec::new(),
            compatibility: Vec::new(),
            flags: DisplayFlags::default(),
            priority: 0,
            main_image: None,
            additional_images: Vec::new(),
            date_posted: None,
            explicit_status: None,
        }
    }

    fn admin() -> SessionUser {
        SessionUser {
            uid: "u1".into(),
            email: Some("admin@xpress.io".into()),
            role: "admin".into(),
        }
    }

    fn ids(state: &AppState) -> Vec<&str> {
        state.products.items.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn delete_removes_exactly_that_id() {
        let mut state = AppState::default();
        reduce(
            &mut state,
            Action::ProductsFetchFulfilled(vec![
                product("000", "a"),
                product("001", "b"),
                product("002", "c"),
            ]),
        );

        reduce(&mut state, Action::ProductDeletePending);
        assert_eq!(state.products.status, RequestStatus::Loading);
        reduce(&mut state, Action::ProductDeleteFulfilled { id: "001".into() });

        assert_eq!(ids(&state), vec!["000", "002"]);
        assert_eq!(state.products.status, RequestStatus::Succeeded);
    }

    #[test]
    fn update_replaces_by_id_and_ignores_unknown() {
        let mut state = AppState::default();
        reduce(
            &mut state,
            Action::ProductsFetchFulfilled(vec![product("1", "old"), product("2", "other")]),
        );

        reduce(
            &mut state,
            Action::ProductUpdateFulfilled(Some(product("1", "new"))),
        );
        reduce(
            &mut state,
            Action::ProductUpdateFulfilled(Some(product("9", "ghost"))),
        );

        let names: Vec<&str> = state.products.items.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["new", "other"]);
    }

    #[test]
    fn add_appends_echoed_product() {
        let mut state = AppState::default();
        reduce(&mut state, Action::ProductAddFulfilled(Some(product("7", "x"))));
        reduce(&mut state, Action::ProductAddFulfilled(None));
        assert_eq!(ids(&state), vec!["7"]);
    }

    #[test]
    fn rejection_keeps_items_and_records_error() {
        let mut state = AppState::default();
        reduce(&mut state, Action::ProductsFetchFulfilled(vec![product("1", "a")]));
        reduce(&mut state, Action::ProductsFetchPending);
        reduce(&mut state, Action::ProductsFetchRejected("boom".into()));

        assert_eq!(state.products.status, RequestStatus::Failed);
        assert_eq!(state.products.error.as_deref(), Some("boom"));
        assert_eq!(ids(&state), vec!["1"]);
    }

    #[test]
    fn login_lifecycle() {
        let mut state = AppState::default();
        reduce(&mut state, Action::LoginPending);
        assert_eq!(state.auth.status, RequestStatus::Loading);

        reduce(
            &mut state,
            Action::LoginFulfilled {
                token: SecretString::from("tok"),
                user: admin(),
                expires_at_ms: 5_000,
            },
        );
        assert!(state.auth.is_authenticated_at(4_999));
        assert!(!state.auth.is_authenticated_at(5_000));
        assert!(state.auth.session_at(1_000).is_some_and(|s| s.is_admin()));

        reduce(&mut state, Action::Logout);
        assert!(!state.auth.is_authenticated_at(0));
        assert_eq!(state.auth.status, RequestStatus::Idle);
    }

    #[test]
    fn login_rejection_clears_credentials() {
        let mut state = AppState::default();
        reduce(
            &mut state,
            Action::SetCredentials {
                token: SecretString::from("tok"),
                user: None,
                expires_at_ms: i64::MAX,
            },
        );
        reduce(
            &mut state,
            Action::LoginRejected("You do not have admin access".into()),
        );
        assert!(state.auth.token.is_none());
        assert_eq!(state.auth.status, RequestStatus::Failed);
        assert_eq!(
            state.auth.error.as_deref(),
            Some("You do not have admin access")
        );
    }
}
