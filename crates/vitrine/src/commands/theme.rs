//! Theme preference handlers.

use crate::cli::{ThemeArgs, ThemeCommand};
use crate::error::CliError;

use super::Context;

pub fn handle(ctx: &Context, args: ThemeArgs) -> Result<(), CliError> {
    let prefs = &ctx.session.preferences;
    let theme = match args.command {
        ThemeCommand::Show => prefs.theme(),
        ThemeCommand::Toggle => prefs.toggle_theme()?,
        ThemeCommand::Set { theme } => {
            prefs.set_theme(theme.into())?;
            prefs.theme()
        }
    };
    ctx.print(&theme.to_string());
    Ok(())
}
