// ── Users, roles and the signed-in session ──

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Role claim granting access to the admin surfaces.
pub const ADMIN_ROLE: &str = "admin";

/// Role shown for users with no role set.
pub const DEFAULT_USER_ROLE: &str = "customer";

/// Roles an admin may assign.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    Customer,
    Vendor,
    Admin,
    Moderator,
}

/// A marketplace user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub uid: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub user_name: Option<String>,
    /// Raw role string; may be outside [`Role`] (e.g. `user`).
    pub role: Option<String>,
}

impl User {
    pub fn role_label(&self) -> &str {
        self.role
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_USER_ROLE)
    }

    pub fn display_name_or_na(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("N/A")
    }

    /// Name used when this user is shown as a product's vendor:
    /// display name, else user name, else email.
    pub fn vendor_label(&self) -> Option<&str> {
        [&self.display_name, &self.user_name, &self.email]
            .into_iter()
            .find_map(|v| v.as_deref().filter(|s| !s.is_empty()))
    }
}

/// Identity of the signed-in admin, persisted with the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    pub role: String,
}

impl SessionUser {
    pub fn is_admin(&self) -> bool {
        self.role == ADMIN_ROLE
    }
}

/// A live (unexpired) session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: SecretString,
    pub user: Option<SessionUser>,
    /// Absolute expiry, milliseconds since the epoch.
    pub expires_at_ms: i64,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.as_ref().is_some_and(SessionUser::is_admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display: Option<&str>, user_name: Option<&str>, email: Option<&str>) -> User {
        User {
            uid: "u1".into(),
            email: email.map(Into::into),
            display_name: display.map(Into::into),
            user_name: user_name.map(Into::into),
            role: None,
        }
    }

    #[test]
    fn role_defaults_to_customer() {
        assert_eq!(user(None, None, None).role_label(), "customer");
    }

    #[test]
    fn vendor_label_precedence() {
        assert_eq!(user(Some("Ada"), Some("ada99"), Some("a@x.io")).vendor_label(), Some("Ada"));
        assert_eq!(user(Some(""), Some("ada99"), Some("a@x.io")).vendor_label(), Some("ada99"));
        assert_eq!(user(None, None, Some("a@x.io")).vendor_label(), Some("a@x.io"));
        assert_eq!(user(None, None, None).vendor_label(), None);
    }

    #[test]
    fn roles_parse_case_insensitively() {
        assert_eq!("Moderator".parse::<Role>().ok(), Some(Role::Moderator));
        assert!("superuser".parse::<Role>().is_err());
    }
}
