//! Account command handlers: login, register, logout, profile.

use dialoguer::Input;
use secrecy::SecretString;
use vitrine_core::{ProfilePatch, UserProfile};

use crate::cli::{LoginArgs, ProfileArgs, ProfileCommand, RegisterArgs};
use crate::error::CliError;
use crate::output;

use super::Context;
use super::util;

fn detail(user: &UserProfile) -> String {
    let mut lines = vec![
        format!("ID:     {}", user.id),
        format!("Name:   {}", user.name),
        format!("Email:  {}", user.email),
    ];
    if let Some(created) = user.created_at {
        lines.push(format!("Joined: {}", created.format("%Y-%m-%d")));
    }
    lines.join("\n")
}

fn print_user(ctx: &Context, user: &UserProfile) -> Result<(), CliError> {
    let out = output::render_single(ctx.output, user, detail, |u| u.email.clone())?;
    ctx.print(&out);
    Ok(())
}

fn password_or_prompt(given: Option<String>) -> Result<SecretString, CliError> {
    let raw = match given {
        Some(pw) => pw,
        None => rpassword::prompt_password("Password: ")?,
    };
    Ok(SecretString::from(raw))
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn login(ctx: &Context, args: LoginArgs) -> Result<(), CliError> {
    let email = match args.email {
        Some(email) => email,
        None => Input::<String>::new()
            .with_prompt("Email")
            .interact_text()
            .map_err(util::prompt_err)?,
    };
    let password = password_or_prompt(args.password)?;

    if let Some(user) = ctx.session.auth.login(&email, &password).await? {
        print_user(ctx, &user)?;
    }
    Ok(())
}

pub async fn register(ctx: &Context, args: RegisterArgs) -> Result<(), CliError> {
    let password = password_or_prompt(args.password)?;
    if let Some(user) = ctx
        .session
        .auth
        .register(&args.name, &args.email, &password)
        .await?
    {
        print_user(ctx, &user)?;
    }
    Ok(())
}

pub fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.session.auth.logout()?;
    Ok(())
}

pub async fn whoami(ctx: &Context, refresh: bool) -> Result<(), CliError> {
    let auth = &ctx.session.auth;
    if !auth.is_authenticated() {
        return Err(CliError::AuthFailed {
            message: "Not signed in".into(),
        });
    }
    let user = if refresh {
        Some(auth.refresh_profile().await?)
    } else {
        auth.user()
    };
    match user {
        Some(user) => print_user(ctx, &user),
        // Token without a stored profile: show what the store knows
        None => {
            ctx.print(&auth.display_name());
            Ok(())
        }
    }
}

pub async fn profile(ctx: &Context, args: ProfileArgs) -> Result<(), CliError> {
    let auth = &ctx.session.auth;
    match args.command {
        ProfileCommand::Show => {
            let user = auth.refresh_profile().await?;
            print_user(ctx, &user)
        }
        ProfileCommand::Update { name, email } => {
            if name.is_none() && email.is_none() {
                return Err(CliError::Validation {
                    field: "profile".into(),
                    reason: "pass --name and/or --email".into(),
                });
            }
            let user = auth.update_profile(&ProfilePatch { name, email }).await?;
            print_user(ctx, &user)
        }
    }
}
