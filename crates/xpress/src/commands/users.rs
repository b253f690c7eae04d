//! User and role command handlers.

use tabled::Tabled;

use xpress_core::{Command as CoreCommand, Role, User};

use crate::cli::{GlobalOpts, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::{CliContext, util};

const ROLES: &str = "customer, vendor, admin, moderator";

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "UID")]
    uid: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Display Name")]
    name: String,
    #[tabled(rename = "Role")]
    role: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            uid: u.uid.clone(),
            email: u.email.clone().unwrap_or_default(),
            name: u.display_name_or_na().to_owned(),
            role: u.role_label().to_owned(),
        }
    }
}

pub async fn handle(ctx: &CliContext, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.require_admin()?;

    match args.command {
        UsersCommand::List { role } => {
            let bar = util::spinner("Loading users", global);
            // Vendors have a server-side query; other roles filter locally.
            let result = if role.as_deref() == Some("vendor") {
                ctx.controller.load_vendor_directory().await
            } else {
                ctx.controller.load_users().await
            };
            bar.finish_and_clear();
            result?;

            let users = if role.as_deref() == Some("vendor") {
                ctx.controller.vendor_users().data()
            } else {
                ctx.controller.users().data()
            };
            let shown: Vec<&User> = users
                .iter()
                .filter(|u| role.as_deref().is_none_or(|r| u.role_label() == r))
                .collect();

            let out = output::render_list(
                &global.output,
                &shown,
                |u| UserRow::from(*u),
                |u| u.uid.clone(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Assign { uid, role } => {
            let role: Role = util::parse_flag("role", &role, ROLES)?;
            let cmd = CoreCommand::AssignRole { uid, role };
            let success = cmd.success_message();
            let prefix = cmd.failure_prefix();
            ctx.controller
                .execute(cmd)
                .await
                .map_err(|e| ctx.auth_error(e).with_prefix(prefix))?;
            output::notice(success, global.quiet);
            Ok(())
        }
    }
}
