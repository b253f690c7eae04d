mod cli;
mod commands;
mod config;
mod error;
mod output;

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use xpress_config::FileSessionStore;
use xpress_core::Controller;

use crate::cli::{CategoriesCommand, Cli, Command};
use crate::commands::CliContext;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a backend
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "xpress", &mut std::io::stdout());
            Ok(())
        }

        Command::Categories(ref args) if matches!(args.command, CategoriesCommand::List) => {
            commands::categories::list(&cli.global)
        }

        cmd => {
            let ctx = build_context(&cli.global)?;
            tracing::debug!(command = ?cmd, profile = %ctx.profile_name, "dispatching command");
            commands::dispatch(cmd, &ctx, &cli.global).await
        }
    }
}

/// Resolve the profile, restore its saved session and build the controller.
fn build_context(global: &cli::GlobalOpts) -> Result<CliContext, CliError> {
    let cfg = config::load_config_or_default();
    let profile_name = config::active_profile_name(global, &cfg);
    let profile = config::active_profile(global, &cfg, &profile_name)?;
    let resolved = config::resolve_profile(&profile, &profile_name, &cfg, global)?;
    let page_size = resolved.page_size;

    let sessions = Arc::new(FileSessionStore::for_profile(&profile_name));
    let controller = Controller::new(resolved, sessions)?;

    Ok(CliContext {
        controller,
        profile_name,
        profile,
        page_size,
    })
}
