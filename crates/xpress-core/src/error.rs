// ── Core error types ──
//
// User-facing errors from xpress-core. Consumers never see reqwest types or
// raw JSON failures; the `From<xpress_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Session expired -- sign in again")]
    SessionExpired,

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// Signed in, but the role does not grant admin access.
    #[error("You do not have admin access")]
    Forbidden { role: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach backend at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Backend answered with a non-JSON body (proxy error page, cold start).
    #[error("Service unavailable (HTTP {status})")]
    ServiceUnavailable { status: u16 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Validation errors ────────────────────────────────────────────
    /// Required form fields were left empty.
    #[error("{message}")]
    MissingFields {
        message: String,
        fields: Vec<&'static str>,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Local errors ─────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &str, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            identifier: identifier.into(),
        }
    }

    /// `true` for a missing entity, whether detected locally or reported
    /// by the backend as a 404.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::Api { status: Some(404), .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<xpress_api::Error> for CoreError {
    fn from(err: xpress_api::Error) -> Self {
        match err {
            xpress_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            xpress_api::Error::SessionExpired => CoreError::SessionExpired,
            xpress_api::Error::MissingToken => CoreError::NotAuthenticated,
            xpress_api::Error::InvalidToken(reason) => CoreError::AuthenticationFailed {
                message: format!("Invalid identity token: {reason}"),
            },
            xpress_api::Error::Identity { message, .. } => {
                CoreError::AuthenticationFailed { message }
            }
            xpress_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            xpress_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            xpress_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            xpress_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            xpress_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            xpress_api::Error::ServiceUnavailable { status, preview } => {
                tracing::debug!(status, %preview, "non-JSON response body");
                CoreError::ServiceUnavailable { status }
            }
            xpress_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
            xpress_api::Error::File { path, reason } => CoreError::Io { path, reason },
        }
    }
}
