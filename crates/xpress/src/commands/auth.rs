//! Sign-in, sign-out and session inspection.

use std::io::IsTerminal;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use xpress_config::ConfigError;
use xpress_core::{CoreError, LoginForm, Session};

use crate::cli::{GlobalOpts, LoginArgs, ResetPasswordArgs};
use crate::error::CliError;
use crate::output;

use super::CliContext;

/// Serializable view of the session; never carries the token.
#[derive(Serialize)]
struct WhoAmI {
    uid: String,
    email: Option<String>,
    role: String,
    expires_at: String,
}

impl From<&Session> for WhoAmI {
    fn from(s: &Session) -> Self {
        let expires_at = chrono::DateTime::from_timestamp_millis(s.expires_at_ms)
            .map(|t| t.to_rfc3339())
            .unwrap_or_default();
        let user = s.user.clone();
        Self {
            uid: user.as_ref().map(|u| u.uid.clone()).unwrap_or_default(),
            email: user.as_ref().and_then(|u| u.email.clone()),
            role: user.map_or_else(|| "user".into(), |u| u.role),
            expires_at,
        }
    }
}

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Email from the flag, then the profile, then a prompt.
fn resolve_email(flag: Option<String>, ctx: &CliContext) -> Result<String, CliError> {
    if let Some(email) = flag.or_else(|| ctx.profile.email.clone()) {
        return Ok(email);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::Validation {
            field: "email".into(),
            reason: "pass --email or set `email` in the profile".into(),
        });
    }
    dialoguer::Input::new()
        .with_prompt("Email")
        .interact_text()
        .map_err(prompt_err)
}

/// Password from env, keyring or profile; prompt as a last resort.
fn resolve_password(ctx: &CliContext) -> Result<SecretString, CliError> {
    match xpress_config::resolve_password(&ctx.profile, &ctx.profile_name) {
        Ok(pw) => Ok(pw),
        Err(ConfigError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
            rpassword::prompt_password("Password: ")
                .map(SecretString::from)
                .map_err(prompt_err)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(ctx: &CliContext, args: LoginArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let result = if let Some(token) = args.provider_token {
        ctx.controller.login_with_provider_token(&token).await
    } else {
        let form = LoginForm {
            email: resolve_email(args.email, ctx)?,
            password: resolve_password(ctx)?.expose_secret().to_owned(),
        };
        let (email, password) = form.validate()?;
        ctx.controller.login(email, password).await
    };

    let session = result.map_err(|e| login_error(ctx, e))?;
    let who = WhoAmI::from(&session);
    output::notice(
        &format!(
            "Signed in as {} ({})",
            who.email.as_deref().unwrap_or(&who.uid),
            who.role
        ),
        global.quiet,
    );
    Ok(())
}

/// The reducer already phrased the failure ("Failed to log in: ...");
/// reuse that text for authentication errors.
fn login_error(ctx: &CliContext, err: CoreError) -> CliError {
    match err {
        CoreError::AuthenticationFailed { .. } => {
            let message = ctx
                .controller
                .store()
                .with_state(|s| s.auth.error.clone())
                .unwrap_or_else(|| err.to_string());
            CliError::AuthFailed {
                message,
                profile: ctx.profile_name.clone(),
            }
        }
        other => ctx.auth_error(other),
    }
}

pub fn logout(ctx: &CliContext, global: &GlobalOpts) {
    ctx.controller.logout();
    output::notice("Signed out", global.quiet);
}

pub fn whoami(ctx: &CliContext, global: &GlobalOpts) -> Result<(), CliError> {
    let session = ctx.controller.session().ok_or_else(|| {
        if ctx.controller.store().with_state(|s| s.auth.token.is_some()) {
            CliError::SessionExpired
        } else {
            CliError::NotSignedIn
        }
    })?;
    let who = WhoAmI::from(&session);

    let out = output::render_single(
        &global.output,
        &who,
        |w| {
            output::detail_lines(&[
                ("UID", w.uid.clone()),
                ("Email", w.email.clone().unwrap_or_default()),
                ("Role", w.role.clone()),
                ("Expires", w.expires_at.clone()),
                ("Profile", ctx.profile_name.clone()),
            ])
        },
        |w| w.email.clone().unwrap_or_else(|| w.uid.clone()),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn reset_password(
    ctx: &CliContext,
    args: ResetPasswordArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = resolve_email(args.email, ctx)?;
    ctx.controller
        .reset_password(&email)
        .await
        .map_err(|e| ctx.auth_error(e))?;
    output::notice(&format!("Password reset email sent to {email}"), global.quiet);
    Ok(())
}
