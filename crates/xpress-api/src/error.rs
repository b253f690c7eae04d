use thiserror::Error;

/// Top-level error type for the `xpress-api` crate.
///
/// Covers every failure mode across both API surfaces: the marketplace
/// REST backend and the identity provider. `xpress-core` maps these into
/// user-facing errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login failed or the backend rejected the bearer token (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The stored bearer token has passed its expiry.
    #[error("Session expired -- sign in again")]
    SessionExpired,

    /// An authenticated call was attempted without a bearer token.
    #[error("No bearer token set -- sign in first")]
    MissingToken,

    /// An identity token could not be decoded.
    #[error("Invalid identity token: {0}")]
    InvalidToken(String),

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response from the backend, with the `message` field of the
    /// body when present.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The backend answered with something that is not JSON (HTML error
    /// page from a proxy, a cold-starting host, an empty body).
    #[error("Service unavailable (HTTP {status})")]
    ServiceUnavailable { status: u16, preview: String },

    // ── Identity provider ───────────────────────────────────────────
    /// Structured `{error: {code, message}}` failure from the identity provider.
    #[error("Identity provider error: {message}")]
    Identity { code: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A local file could not be read for upload.
    #[error("Failed to read {path}: {reason}")]
    File { path: String, reason: String },
}

impl Error {
    /// Returns `true` if this error indicates the session is gone
    /// and signing in again might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::SessionExpired | Self::MissingToken
        )
    }

    /// Returns `true` if this is a transient error worth retrying.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } | Self::ServiceUnavailable { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::ServiceUnavailable { status, .. } => Some(*status),
            Self::Identity { code, .. } => Some(*code),
            Self::Authentication { .. } => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
