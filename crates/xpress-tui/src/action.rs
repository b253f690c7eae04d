//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::fmt;
use std::path::PathBuf;

use secrecy::SecretString;

use xpress_core::{Invalidation, Product, ResourceState, Role, SessionUser, User, Vendor};

use crate::screen::ScreenId;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

/// A toast notification.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Pending confirmation action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteProduct { id: String, name: String, hard: bool },
    DeleteProducts { ids: Vec<String> },
    DeleteVendor { id: String, name: String },
    DeleteVendors { ids: Vec<String> },
    AssignRole { uid: String, email: String, role: Role },
}

impl fmt::Display for ConfirmAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteProduct { name, hard: false, .. } => write!(f, "Delete {name}?"),
            Self::DeleteProduct { name, hard: true, .. } => {
                write!(f, "Permanently delete {name}? This cannot be undone.")
            }
            Self::DeleteProducts { ids } => write!(f, "Delete {} selected products?", ids.len()),
            Self::DeleteVendor { name, .. } => write!(f, "Delete vendor {name}?"),
            Self::DeleteVendors { ids } => write!(f, "Delete {} selected vendors?", ids.len()),
            Self::AssignRole { email, role, .. } => write!(f, "Make {email} a {role}?"),
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    /// Open the products screen on one category, or on the whole catalog.
    BrowseCategory(Option<&'static str>),

    // ── Session ───────────────────────────────────────────────────
    LoginSubmit { email: String, password: SecretString },
    LoginSucceeded(Option<SessionUser>),
    LoginFailed(String),
    RequestPasswordReset(String),
    Logout,
    LoggedOut,

    // ── Loads (handled by the app) ────────────────────────────────
    LoadProducts,
    LoadCategory(&'static str),
    LoadVendors,
    LoadUsers,

    // ── Data Events ───────────────────────────────────────────────
    /// Catalog result for request number `request`; the app forwards it
    /// as `ProductsUpdated` only while that request is the latest.
    ProductsFetched {
        request: u64,
        state: ResourceState<Product>,
    },
    ProductsUpdated(ResourceState<Product>),
    CategoryProductsUpdated(ResourceState<Product>),
    VendorsUpdated(ResourceState<Vendor>),
    UsersUpdated(ResourceState<User>),
    Invalidated(Invalidation),

    // ── Confirm Dialog ────────────────────────────────────────────
    ShowConfirm(ConfirmAction),
    ConfirmYes,
    ConfirmNo,

    // ── Export ────────────────────────────────────────────────────
    WriteExport { path: PathBuf, contents: String, rows: usize },

    // ── Search ────────────────────────────────────────────────────
    OpenSearch,
    CloseSearch,
    SearchInput(String),
    SearchSubmit,

    // ── Help ──────────────────────────────────────────────────────
    ToggleHelp,

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
}
