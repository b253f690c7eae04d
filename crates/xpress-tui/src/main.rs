//! `xpress-tui`: terminal admin console for the Xpress marketplace.
//!
//! Built on [ratatui](https://ratatui.rs) over `xpress-core`'s
//! [`Controller`]. Screens are navigable via number keys (1-4): Products,
//! Vendors, Categories and Roles. Without a live admin session the app
//! opens on the login screen.
//!
//! Logs are written to a file (default `<data dir>/xpress-tui.log`) to avoid
//! corrupting the terminal UI. A background data bridge forwards resource
//! updates and cache invalidations into the action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, eyre};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use xpress_config::FileSessionStore;
use xpress_core::Controller;

use crate::app::{App, LoginDefaults};

/// Terminal console for administering the Xpress auto-parts marketplace.
#[derive(Parser, Debug)]
#[command(name = "xpress-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short = 'p', long, env = "XPRESS_PROFILE")]
    profile: Option<String>,

    /// Backend URL, overriding the profile
    #[arg(short = 'u', long, env = "XPRESS_API_URL")]
    api_url: Option<String>,

    /// Log file path (defaults to xpress-tui.log in the data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing. Writing to stdout/stderr would corrupt the TUI.
/// Hold the returned guard for the lifetime of the app so logs flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "xpress_tui={log_level},xpress_core={log_level},xpress_api={log_level}"
        ))
    });

    let log_file = cli
        .log_file
        .clone()
        .unwrap_or_else(|| xpress_config::data_dir().join("xpress-tui.log"));
    let log_dir = log_file.parent().unwrap_or(Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("xpress-tui.log"));
    let _ = std::fs::create_dir_all(log_dir);

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Resolve the profile, restore its saved session and build the controller.
///
/// Priority: CLI flags > config file > built-in defaults.
fn build_controller(cli: &Cli) -> Result<(Controller, LoginDefaults, usize)> {
    let cfg = xpress_config::load_config_or_default();
    let profile_name = cli
        .profile
        .clone()
        .or_else(|| cfg.default_profile.clone())
        .unwrap_or_else(|| "default".into());

    let profile = match cfg.profiles.get(&profile_name) {
        Some(p) => p.clone(),
        None if cli.profile.is_some() => {
            return Err(eyre!("profile '{profile_name}' not found in config"));
        }
        None => xpress_config::Profile::default(),
    };

    let mut config =
        xpress_config::profile_to_controller_config(&profile, &profile_name, &cfg.defaults)?;
    if let Some(ref url) = cli.api_url {
        config.api_url = xpress_config::parse_api_url(url)?;
    }
    let page_size = config.page_size;

    let login = LoginDefaults {
        email: profile.email.clone().unwrap_or_default(),
        password: xpress_config::resolve_password(&profile, &profile_name).ok(),
    };

    info!(profile = %profile_name, api_url = %config.api_url, "starting xpress-tui");

    let sessions = Arc::new(FileSessionStore::for_profile(&profile_name));
    let controller = Controller::new(config, sessions)?;
    Ok((controller, login, page_size))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    let (controller, login, page_size) = build_controller(&cli)?;
    let mut app = App::new(controller, login, page_size);
    app.run().await?;

    Ok(())
}
