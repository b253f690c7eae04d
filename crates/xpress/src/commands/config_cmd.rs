//! Config subcommand handlers.

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

const MASK: &str = "****";

const SETTABLE_KEYS: &str = "api_url, auth, email, identity_api_key, identity_api_key_env, \
     identity_url, insecure, timeout, page_size, ca_cert";

// ── Helpers ─────────────────────────────────────────────────────────

/// A copy of `cfg` with every stored secret masked.
fn redacted(cfg: &Config) -> Config {
    let profiles = cfg
        .profiles
        .iter()
        .map(|(name, p)| {
            let mut p = p.clone();
            if p.password.is_some() {
                p.password = Some(MASK.into());
            }
            if p.identity_api_key.is_some() {
                p.identity_api_key = Some(MASK.into());
            }
            (name.clone(), p)
        })
        .collect();
    Config {
        default_profile: cfg.default_profile.clone(),
        defaults: Defaults {
            output: cfg.defaults.output.clone(),
            color: cfg.defaults.color.clone(),
            timeout: cfg.defaults.timeout,
            page_size: cfg.defaults.page_size,
        },
        profiles,
    }
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_secret(label: &str) -> Result<String, CliError> {
    let secret = rpassword::prompt_password(label).map_err(prompt_err)?;
    if secret.is_empty() {
        return Err(CliError::Validation {
            field: "secret".into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(secret)
}

/// Offer keyring storage for a secret.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_keyring_storage(
    secret: String,
    store: impl FnOnce(&str) -> Result<(), xpress_config::ConfigError>,
    label: &str,
) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let selection = Select::new()
        .with_prompt(format!("Where to store the {label}?"))
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        store(&secret)?;
        eprintln!("   ✓ {label} stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(secret))
    }
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, hint: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: hint.into(),
    })
}

/// Apply `key = value` to a profile.
fn set_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key.replace('-', "_").as_str() {
        "api_url" => {
            xpress_config::parse_api_url(&value)?;
            profile.api_url = value;
        }
        "auth" => {
            if !matches!(value.as_str(), "identity" | "backend") {
                return Err(CliError::Validation {
                    field: "auth".into(),
                    reason: "must be 'identity' or 'backend'".into(),
                });
            }
            profile.auth = value;
        }
        "email" => profile.email = Some(value),
        "identity_api_key" => profile.identity_api_key = Some(value),
        "identity_api_key_env" => profile.identity_api_key_env = Some(value),
        "identity_url" => profile.identity_url = Some(value),
        "insecure" => {
            profile.insecure = Some(parse_value("insecure", &value, "must be 'true' or 'false'")?);
        }
        "timeout" => {
            profile.timeout = Some(parse_value("timeout", &value, "must be a number (seconds)")?);
        }
        "page_size" => {
            let size: usize = parse_value("page_size", &value, "must be a positive number")?;
            if size == 0 {
                return Err(CliError::Validation {
                    field: "page_size".into(),
                    reason: "must be a positive number".into(),
                });
            }
            profile.page_size = Some(size);
        }
        "ca_cert" => profile.ca_cert = Some(value.into()),
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!("unknown config key '{other}'. Valid keys: {SETTABLE_KEYS}"),
            });
        }
    }
    Ok(())
}

// ── Wizard ──────────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = config::config_path();
    eprintln!("Xpress CLI configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let api_url: String = Input::new()
        .with_prompt("Backend URL")
        .default(xpress_core::config::DEFAULT_API_URL.into())
        .validate_with(|s: &String| {
            xpress_config::parse_api_url(s)
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .interact_text()
        .map_err(prompt_err)?;

    let auth_choices = &[
        "Backend (the marketplace issues its own tokens)",
        "Identity provider (email/password via the hosted identity service)",
    ];
    let auth_selection = Select::new()
        .with_prompt("Sign-in method")
        .items(auth_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let mut profile = Profile {
        api_url,
        ..Profile::default()
    };

    if auth_selection == 1 {
        profile.auth = "identity".into();
        let key_choices = &[
            "Read it from an environment variable",
            "Enter it now",
        ];
        let key_selection = Select::new()
            .with_prompt("Identity API key")
            .items(key_choices)
            .default(0)
            .interact()
            .map_err(prompt_err)?;
        if key_selection == 0 {
            let env: String = Input::new()
                .with_prompt("Variable name")
                .default("XPRESS_IDENTITY_API_KEY".into())
                .interact_text()
                .map_err(prompt_err)?;
            profile.identity_api_key_env = Some(env);
        } else {
            let key = prompt_secret("API key: ")?;
            profile.identity_api_key = prompt_keyring_storage(
                key,
                |k| config::store_identity_key(&profile_name, k),
                "API key",
            )?;
        }
    }

    let email: String = Input::new()
        .with_prompt("Admin email")
        .interact_text()
        .map_err(prompt_err)?;
    profile.email = Some(email);

    let save_password = Select::new()
        .with_prompt("Save a password for this profile?")
        .items(&["No, prompt at login", "Yes"])
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    if save_password == 1 {
        let pass = prompt_secret("Password: ")?;
        profile.password = prompt_keyring_storage(
            pass,
            |p| config::store_password(&profile_name, p),
            "password",
        )?;
    }

    // Merge into the existing file so other profiles survive a re-run.
    let mut cfg = config::load_config_or_default();
    cfg.profiles.insert(profile_name.clone(), profile);
    cfg.default_profile = Some(profile_name.clone());
    save_config(&cfg)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Next: xpress login");
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Show => {
            let cfg = redacted(&config::load_config_or_default());
            let out = output::render_single(
                &global.output,
                &cfg,
                |c| toml::to_string_pretty(c).unwrap_or_default(),
                |c| {
                    c.default_profile
                        .clone()
                        .unwrap_or_else(|| "default".into())
                },
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_key(profile, &key, value)?;
            save_config(&cfg)?;
            output::notice(&format!("✓ Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                output::notice("No profiles configured. Run: xpress config init", global.quiet);
                return Ok(());
            }
            let mut names: Vec<_> = cfg.profiles.keys().collect();
            names.sort();
            let lines = names
                .into_iter()
                .map(|name| {
                    let marker = if name == default { " *" } else { "" };
                    format!("{name}{marker}")
                })
                .collect::<Vec<_>>()
                .join("\n");
            output::print_output(&lines, global.quiet);
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(config::profile_not_found(&cfg, &name));
            }
            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let prof = cfg
                .profiles
                .get(&profile_name)
                .ok_or_else(|| config::profile_not_found(&cfg, &profile_name))?;

            let password = prompt_secret("Password: ")?;
            config::store_password(&profile_name, &password)?;
            if prof.auth == "identity"
                && prof.identity_api_key_env.is_none()
                && prof.identity_api_key.is_none()
            {
                let key = prompt_secret("Identity API key: ")?;
                config::store_identity_key(&profile_name, &key)?;
            }

            output::notice(
                &format!("✓ Secret(s) stored in system keyring for profile '{profile_name}'"),
                global.quiet,
            );
            Ok(())
        }
    }
}
