//! CLI configuration: thin wrapper around `xpress_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --timeout, etc.).

use std::time::Duration;

use xpress_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use xpress_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config, store_identity_key,
    store_password,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// The named profile, or built-in defaults when the config has none by
/// that name. Naming a profile explicitly that does not exist is an error.
pub fn active_profile(
    global: &GlobalOpts,
    config: &Config,
    profile_name: &str,
) -> Result<Profile, CliError> {
    match config.profiles.get(profile_name) {
        Some(profile) => Ok(profile.clone()),
        None if global.profile.is_some() => Err(profile_not_found(config, profile_name)),
        None => Ok(Profile::default()),
    }
}

pub fn profile_not_found(config: &Config, name: &str) -> CliError {
    let mut available: Vec<_> = config.profiles.keys().cloned().collect();
    available.sort();
    CliError::ProfileNotFound {
        name: name.into(),
        available: if available.is_empty() {
            "(none)".into()
        } else {
            available.join(", ")
        },
    }
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    config: &Config,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let mut resolved =
        xpress_config::profile_to_controller_config(profile, profile_name, &config.defaults)?;

    if let Some(ref url) = global.api_url {
        resolved.api_url = xpress_config::parse_api_url(url)?;
    }
    if global.insecure {
        resolved.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        resolved.timeout = Duration::from_secs(secs);
    }

    Ok(resolved)
}
