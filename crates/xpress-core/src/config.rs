// ── Runtime connection configuration ──
//
// These types describe *how* to reach the backend and sign in. They carry
// credential data and connection tuning, but never touch disk. The CLI/TUI
// constructs a `ControllerConfig` and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:3001";

/// Default list page size.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Which service issues bearer tokens.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// Hosted identity provider (email/password, federated, password reset).
    /// The role is read from the ID token's `role` claim.
    Identity {
        api_key: SecretString,
        /// Override for the identity toolkit base URL.
        url: Option<String>,
    },
    /// The backend's own `POST /auth/login`.
    Backend,
}

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (local development backends).
    DangerAcceptInvalid,
}

/// Configuration for one backend.
///
/// Built by CLI/TUI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Backend base URL (e.g. `http://localhost:3001`).
    pub api_url: Url,
    pub auth: AuthMode,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Rows per list page.
    pub page_size: usize,
}

impl ControllerConfig {
    pub fn new(api_url: Url, auth: AuthMode) -> Self {
        Self {
            api_url,
            auth,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}
