//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod auth;
pub mod categories;
pub mod config_cmd;
pub mod products;
pub mod users;
pub mod util;
pub mod vendors;

use xpress_core::{Controller, CoreError};

use crate::cli::{Command, GlobalOpts};
use crate::config::Profile;
use crate::error::CliError;

/// Everything a backend-bound handler needs.
pub struct CliContext {
    pub controller: Controller,
    pub profile_name: String,
    pub profile: Profile,
    /// Rows per page after profile and defaults are applied.
    pub page_size: usize,
}

impl CliContext {
    /// Fail fast without a live admin session.
    pub fn require_admin(&self) -> Result<(), CliError> {
        self.controller
            .require_admin()
            .map(|_| ())
            .map_err(|e| self.auth_error(e))
    }

    /// Attach the profile name to authentication failures.
    pub fn auth_error(&self, err: CoreError) -> CliError {
        match CliError::from(err) {
            CliError::AuthFailed { message, .. } => CliError::AuthFailed {
                message,
                profile: self.profile_name.clone(),
            },
            other => other,
        }
    }
}

/// Dispatch a backend-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &CliContext, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args, global).await,
        Command::Logout => {
            auth::logout(ctx, global);
            Ok(())
        }
        Command::Whoami => auth::whoami(ctx, global),
        Command::ResetPassword(args) => auth::reset_password(ctx, args, global).await,
        Command::Products(args) => products::handle(ctx, args, global).await,
        Command::Vendors(args) => vendors::handle(ctx, args, global).await,
        Command::Users(args) => users::handle(ctx, args, global).await,
        Command::Categories(args) => categories::handle(ctx, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not need a backend connection".into(),
        )),
    }
}
