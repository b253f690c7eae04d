//! Shared configuration for the Xpress CLI and TUI.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext),
//! file-backed session storage, and translation to
//! `xpress_core::ControllerConfig`. Both binaries depend on this crate;
//! the CLI layers its flag overrides on top.

mod session;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use xpress_core::config::{DEFAULT_API_URL, DEFAULT_PAGE_SIZE};
use xpress_core::{AuthMode, ControllerConfig, TlsVerification};

pub use session::{FileSessionStore, session_path};

/// Keyring service name for every stored secret.
pub const KEYRING_SERVICE: &str = "xpress";

/// Env var consulted first for the account password.
pub const PASSWORD_ENV: &str = "XPRESS_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("no identity API key configured for profile '{profile}'")]
    NoIdentityKey { profile: String },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named backend profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

/// A named backend profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Backend base URL (e.g., "http://localhost:3001").
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Who issues tokens: "identity" or "backend".
    #[serde(default = "default_auth")]
    pub auth: String,

    /// Identity provider API key (plaintext; prefer keyring or env var).
    pub identity_api_key: Option<String>,

    /// Environment variable name containing the identity API key.
    pub identity_api_key_env: Option<String>,

    /// Override for the identity toolkit base URL.
    pub identity_url: Option<String>,

    /// Admin account email.
    pub email: Option<String>,

    /// Password (plaintext; prefer keyring).
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Accept invalid TLS certificates.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override rows per page.
    pub page_size: Option<usize>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            auth: default_auth(),
            identity_api_key: None,
            identity_api_key_env: None,
            identity_url: None,
            email: None,
            password: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            page_size: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.into()
}
fn default_auth() -> String {
    "backend".into()
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "xpress", "xpress")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Platform data directory (sessions, TUI logs).
pub fn data_dir() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".local/share"),
        |dirs| dirs.data_dir().to_path_buf(),
    )
}

fn dirs_fallback(base: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(base);
    p.push("xpress");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Layer defaults, the TOML file at `path` and `XPRESS_*` env vars.
///
/// Nested keys use a double underscore: `XPRESS_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("XPRESS_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "config unreadable, using defaults");
        Config::default()
    })
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_secret(profile_name: &str, slot: &str) -> Option<SecretString> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{slot}")).ok()?;
    match entry.get_password() {
        Ok(secret) => Some(SecretString::from(secret)),
        Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            tracing::debug!(error = %e, profile = profile_name, slot, "keyring lookup failed");
            None
        }
    }
}

/// Resolve the account password without prompting.
///
/// Order: `XPRESS_PASSWORD`, system keyring, plaintext in config.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        return Ok(SecretString::from(pw));
    }

    if let Some(pw) = keyring_secret(profile_name, "password") {
        return Ok(pw);
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

fn store_secret(profile_name: &str, slot: &str, secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/{slot}"))?;
    entry.set_password(secret)?;
    Ok(())
}

/// Store the account password in the system keyring.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    store_secret(profile_name, "password", password)
}

/// Store the identity provider API key in the system keyring.
pub fn store_identity_key(profile_name: &str, key: &str) -> Result<(), ConfigError> {
    store_secret(profile_name, "identity-api-key", key)
}

/// Resolve the identity provider API key.
///
/// Order: the env var named by `identity_api_key_env`, system keyring,
/// plaintext in config. There is no built-in key.
pub fn resolve_identity_key(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.identity_api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(key) = keyring_secret(profile_name, "identity-api-key") {
        return Ok(key);
    }

    if let Some(ref key) = profile.identity_api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoIdentityKey {
        profile: profile_name.into(),
    })
}

/// Resolve `AuthMode` from a profile's `auth` field.
pub fn resolve_auth(profile: &Profile, profile_name: &str) -> Result<AuthMode, ConfigError> {
    match profile.auth.as_str() {
        "identity" => Ok(AuthMode::Identity {
            api_key: resolve_identity_key(profile, profile_name)?,
            url: profile.identity_url.clone(),
        }),
        "backend" => Ok(AuthMode::Backend),
        other => Err(ConfigError::Validation {
            field: "auth".into(),
            reason: format!("expected 'identity' or 'backend', got '{other}'"),
        }),
    }
}

pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// Build a `ControllerConfig` from a profile, with no CLI flag overrides.
///
/// Profile values win over `defaults`.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let api_url = parse_api_url(&profile.api_url)?;
    let auth = resolve_auth(profile, profile_name)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    let timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    let page_size = profile.page_size.unwrap_or(defaults.page_size).max(1);

    Ok(ControllerConfig {
        api_url,
        auth,
        tls,
        timeout,
        page_size,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn profile_defaults_point_at_local_backend() {
        let profile: Profile = toml::from_str("").unwrap();
        assert_eq!(profile.api_url, "http://localhost:3001");
        assert_eq!(profile.auth, "backend");
        assert!(profile.password.is_none());
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.defaults.page_size = 25;
        cfg.profiles.insert(
            "staging".into(),
            Profile {
                api_url: "https://api.staging.example".into(),
                email: Some("admin@example.com".into()),
                timeout: Some(5),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.page_size, 25);
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
        let staging = &loaded.profiles["staging"];
        assert_eq!(staging.api_url, "https://api.staging.example");
        assert_eq!(staging.email.as_deref(), Some("admin@example.com"));
        assert_eq!(staging.timeout, Some(5));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.defaults.page_size, 10);
    }

    #[test]
    fn backend_profile_builds_controller_config() {
        let profile = Profile {
            timeout: Some(7),
            ..Profile::default()
        };
        let defaults = Defaults {
            page_size: 20,
            ..Defaults::default()
        };
        let cfg = profile_to_controller_config(&profile, "default", &defaults).unwrap();
        assert_eq!(cfg.api_url.as_str(), "http://localhost:3001/");
        assert!(matches!(cfg.auth, AuthMode::Backend));
        assert_eq!(cfg.tls, TlsVerification::SystemDefaults);
        assert_eq!(cfg.timeout, Duration::from_secs(7));
        assert_eq!(cfg.page_size, 20);
    }

    #[test]
    fn insecure_wins_over_ca_cert() {
        let profile = Profile {
            insecure: Some(true),
            ca_cert: Some("/etc/ca.pem".into()),
            ..Profile::default()
        };
        let cfg = profile_to_controller_config(&profile, "default", &Defaults::default()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_bad_url_and_unknown_auth() {
        let bad_url = Profile {
            api_url: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_controller_config(&bad_url, "p", &Defaults::default()).unwrap_err();
        assert_eq!(err.to_string(), "invalid api_url: invalid URL: not a url");

        let bad_auth = Profile {
            auth: "oauth".into(),
            ..Profile::default()
        };
        let err = resolve_auth(&bad_auth, "p").unwrap_err();
        assert!(err.to_string().contains("expected 'identity' or 'backend'"));
    }
}
