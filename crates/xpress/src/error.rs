//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use xpress_config::ConfigError;
use xpress_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to backend at {url}")]
    #[diagnostic(
        code(xpress::connection_failed),
        help(
            "Check that the backend is running and reachable.\n\
             Reason: {reason}\n\
             Try: xpress --api-url <URL> products list"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Service unavailable (HTTP {status})")]
    #[diagnostic(
        code(xpress::service_unavailable),
        help("The backend answered with an error page. It may be starting up; retry shortly.")
    )]
    ServiceUnavailable { status: u16 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(
        code(xpress::auth_failed),
        help(
            "Check your email and password.\n\
             Store the password with: xpress config set-password --profile {profile}"
        )
    )]
    AuthFailed { message: String, profile: String },

    #[error("Not signed in")]
    #[diagnostic(code(xpress::not_signed_in), help("Run: xpress login"))]
    NotSignedIn,

    #[error("Session expired -- sign in again")]
    #[diagnostic(code(xpress::session_expired), help("Run: xpress login"))]
    SessionExpired,

    #[error("No password configured for profile '{profile}'")]
    #[diagnostic(
        code(xpress::no_credentials),
        help(
            "Set XPRESS_PASSWORD, run: xpress config set-password,\n\
             or sign in interactively from a terminal."
        )
    )]
    NoCredentials { profile: String },

    #[error("No identity API key configured for profile '{profile}'")]
    #[diagnostic(
        code(xpress::no_identity_key),
        help(
            "Set identity_api_key_env to the name of an env var holding the key:\n\
             xpress config set identity_api_key_env XPRESS_IDENTITY_KEY\n\
             or switch to backend sign-in: xpress config set auth backend"
        )
    )]
    NoIdentityKey { profile: String },

    // ── Permission ───────────────────────────────────────────────────
    #[error("You do not have admin access")]
    #[diagnostic(
        code(xpress::forbidden),
        help("Signed in with role '{role}'. Ask an admin to assign you the admin role.")
    )]
    Forbidden { role: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(xpress::not_found),
        help("Run: xpress {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(xpress::api_error))]
    ApiError {
        message: String,
        status: Option<u16>,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(xpress::validation))]
    Validation { field: String, reason: String },

    #[error("{message}")]
    #[diagnostic(
        code(xpress::missing_fields),
        help("Missing: {missing}")
    )]
    MissingFields { message: String, missing: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(xpress::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: xpress config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(xpress::config), help("Config file: {path}"))]
    Config { message: String, path: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(xpress::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(xpress::timeout),
        help("Increase timeout with --timeout or check backend responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(xpress::serialize))]
    Serialize(String),

    #[error("{0}")]
    #[diagnostic(code(xpress::internal))]
    Internal(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::ServiceUnavailable { .. } => {
                exit_code::CONNECTION
            }
            Self::AuthFailed { .. }
            | Self::NotSignedIn
            | Self::SessionExpired
            | Self::NoCredentials { .. }
            | Self::NoIdentityKey { .. } => exit_code::AUTH,
            Self::Forbidden { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::ApiError {
                status: Some(404), ..
            } => exit_code::NOT_FOUND,
            Self::ApiError {
                status: Some(401), ..
            } => exit_code::AUTH,
            Self::ApiError {
                status: Some(403), ..
            } => exit_code::PERMISSION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. }
            | Self::MissingFields { .. }
            | Self::ProfileNotFound { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Prefix the message of a backend failure, e.g. "Failed to add
    /// product: Duplicate part number". Other errors pass through.
    pub fn with_prefix(self, prefix: &str) -> Self {
        match self {
            Self::ApiError { message, status } => Self::ApiError {
                message: format!("{prefix}: {message}"),
                status,
            },
            other => other,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotAuthenticated => CliError::NotSignedIn,
            CoreError::SessionExpired => CliError::SessionExpired,
            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                message,
                profile: "current".into(),
            },
            CoreError::Forbidden { role } => CliError::Forbidden { role },

            CoreError::ConnectionFailed { url, reason } => {
                CliError::ConnectionFailed { url, reason }
            }
            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },
            CoreError::ServiceUnavailable { status } => CliError::ServiceUnavailable { status },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: format!("{}s list", entity_type.to_lowercase()),
                resource_type: entity_type,
                identifier,
            },

            CoreError::MissingFields { message, fields } => CliError::MissingFields {
                message,
                missing: fields.join(", "),
            },
            CoreError::ValidationFailed { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::Api { message, status } => CliError::ApiError { message, status },

            CoreError::Config { message } => CliError::Config {
                message,
                path: xpress_config::config_path().display().to_string(),
            },
            CoreError::Io { path, reason } => {
                CliError::Io(std::io::Error::other(format!("{path}: {reason}")))
            }
            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::NoIdentityKey { profile } => CliError::NoIdentityKey { profile },
            ConfigError::Io(e) => CliError::Io(e),
            other => CliError::Config {
                message: other.to_string(),
                path: xpress_config::config_path().display().to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        assert_eq!(CliError::NotSignedIn.exit_code(), exit_code::AUTH);
        assert_eq!(
            CliError::from(CoreError::Forbidden {
                role: "vendor".into()
            })
            .exit_code(),
            exit_code::PERMISSION
        );
        assert_eq!(
            CliError::from(CoreError::ServiceUnavailable { status: 502 }).exit_code(),
            exit_code::CONNECTION
        );
        assert_eq!(
            CliError::from(CoreError::Timeout { timeout_secs: 3 }).exit_code(),
            exit_code::TIMEOUT
        );
        assert_eq!(
            CliError::from(CoreError::Api {
                message: "Product not found".into(),
                status: Some(404),
            })
            .exit_code(),
            exit_code::NOT_FOUND
        );
        assert_eq!(
            CliError::from(CoreError::MissingFields {
                message: "Please fill in all required fields.".into(),
                fields: vec!["Price"],
            })
            .exit_code(),
            exit_code::USAGE
        );
    }

    #[test]
    fn not_found_points_at_list_command() {
        let err = CliError::from(CoreError::NotFound {
            entity_type: "Product".into(),
            identifier: "p9".into(),
        });
        match err {
            CliError::NotFound { list_command, .. } => assert_eq!(list_command, "products list"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn prefix_applies_to_backend_messages_only() {
        let err = CliError::ApiError {
            message: "Duplicate part number".into(),
            status: Some(400),
        }
        .with_prefix("Failed to add product");
        assert_eq!(err.to_string(), "Failed to add product: Duplicate part number");

        let err = CliError::NotSignedIn.with_prefix("Failed to add product");
        assert_eq!(err.to_string(), "Not signed in");
    }
}
