//! Command dispatch: bridges CLI args -> session stores -> output formatting.

pub mod auth;
pub mod catalog;
pub mod config_cmd;
pub mod dashboard;
pub mod theme;
pub mod util;

use std::sync::Arc;

use vitrine_core::{FileStorage, KeyValueStore, Session};

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::config;
use crate::console::ConsoleNotifier;
use crate::error::CliError;
use crate::output;

/// Everything a command handler needs for one invocation.
pub struct Context {
    pub session: Session,
    pub output: OutputFormat,
    pub quiet: bool,
    pub yes: bool,
}

impl Context {
    /// Resolve config, open the session file and build the session.
    pub fn build(global: &GlobalOpts) -> Result<Self, CliError> {
        let cfg = config::resolve(global)?;
        let storage_path = cfg.storage_path();
        tracing::debug!(path = %storage_path.display(), "opening session storage");
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStorage::open(storage_path)?);
        let notifier = Arc::new(ConsoleNotifier::new(global.quiet, output::should_color()));
        let session = Session::with_notifier(&cfg.to_session_config()?, storage, notifier)?;

        Ok(Self {
            session,
            output: config::output_format(global, &cfg),
            quiet: global.quiet,
            yes: global.yes,
        })
    }

    pub fn print(&self, rendered: &str) {
        output::print_output(rendered, self.quiet);
    }
}

/// Dispatch a session-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &Context) -> Result<(), CliError> {
    match cmd {
        Command::Login(args) => auth::login(ctx, args).await,
        Command::Logout => auth::logout(ctx),
        Command::Register(args) => auth::register(ctx, args).await,
        Command::Whoami { refresh } => auth::whoami(ctx, refresh).await,
        Command::Profile(args) => auth::profile(ctx, args).await,
        Command::Products(args) => catalog::handle(&ctx.session.products, args, ctx).await,
        Command::Cars(args) => catalog::handle(&ctx.session.cars, args, ctx).await,
        Command::Dashboard => dashboard::overview(ctx).await,
        Command::Categories => dashboard::categories(ctx).await,
        Command::Theme(args) => theme::handle(ctx, args),
        // Config and Completions are handled before a session exists
        Command::Config(_) | Command::Completions(_) => Ok(()),
    }
}
