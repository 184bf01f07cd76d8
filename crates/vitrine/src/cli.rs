//! Clap derive structures for the `vitrine` CLI.
//!
//! Defines the command tree, global flags, and shared argument types.

use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use vitrine_core::{SortDirection, SortPreset, Theme};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// vitrine -- catalog administration from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "vitrine",
    version,
    about = "Manage the vitrine product and car catalog from the command line",
    long_about = "Administer products and cars, view the dashboard and manage your\n\
        account against a vitrine backend.\n\n\
        With --fallback, listings are served from built-in sample data while\n\
        the backend is unreachable.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Backend base URL (overrides config)
    #[arg(long, env = "VITRINE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format (defaults to the configured one)
    #[arg(long, short = 'o', env = "VITRINE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Config file to use instead of the platform default
    #[arg(long, env = "VITRINE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Serve built-in sample data when the backend is unreachable
    #[arg(long, global = true)]
    pub fallback: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the session token
    Login(LoginArgs),

    /// Forget the stored session
    Logout,

    /// Create an account and sign in to it
    Register(RegisterArgs),

    /// Show the signed-in user
    Whoami {
        /// Re-fetch the profile from the backend
        #[arg(long)]
        refresh: bool,
    },

    /// View or edit your profile
    Profile(ProfileArgs),

    /// Manage products
    #[command(alias = "p")]
    Products(CatalogArgs),

    /// Manage cars
    #[command(alias = "c")]
    Cars(CatalogArgs),

    /// Show catalog statistics and recent activity
    #[command(alias = "dash")]
    Dashboard,

    /// List categories known to the backend
    Categories,

    /// Show or change the UI theme
    Theme(ThemeArgs),

    /// Inspect CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACCOUNT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Args)]
pub struct LoginArgs {
    /// Account email (prompted when omitted)
    pub email: Option<String>,

    /// Password (prompted when omitted)
    #[arg(long, env = "VITRINE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Args)]
pub struct RegisterArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Account email
    #[arg(long)]
    pub email: String,

    /// Password (prompted when omitted)
    #[arg(long, env = "VITRINE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

fn redacted(password: Option<&str>) -> Option<&'static str> {
    password.map(|_| "<redacted>")
}

impl fmt::Debug for LoginArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginArgs")
            .field("email", &self.email)
            .field("password", &redacted(self.password.as_deref()))
            .finish()
    }
}

impl fmt::Debug for RegisterArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterArgs")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &redacted(self.password.as_deref()))
            .finish()
    }
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommand {
    /// Show the profile stored by the backend
    Show,

    /// Change name and/or email
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CATALOG (products and cars share one command shape)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub command: CatalogCommand,
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List entries matching a filter
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one entry
    Get {
        /// Entry ID
        id: String,
    },

    /// Create an entry from a JSON body
    Create(PayloadArgs),

    /// Update fields of an entry from a JSON body
    Update {
        /// Entry ID
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID
        id: String,
    },

    /// Mark an entry active
    Activate {
        /// Entry ID
        id: String,
    },

    /// Mark an entry inactive
    Deactivate {
        /// Entry ID
        id: String,
    },
}

/// Status filter for list commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl StatusFilter {
    pub fn as_flag(self) -> Option<bool> {
        match self {
            Self::Active => Some(true),
            Self::Inactive => Some(false),
            Self::All => None,
        }
    }
}

/// Shared filtering and ordering arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Only this category
    #[arg(long)]
    pub category: Option<String>,

    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Which entries to include by status
    #[arg(long, value_enum, default_value_t)]
    pub status: StatusFilter,

    /// Minimum price (inclusive)
    #[arg(long)]
    pub min_price: Option<Decimal>,

    /// Maximum price (inclusive)
    #[arg(long)]
    pub max_price: Option<Decimal>,

    /// Field to sort by (e.g. preco, nome, data_criacao)
    #[arg(long, conflicts_with = "preset")]
    pub sort: Option<String>,

    /// Sort direction
    #[arg(long, value_enum, default_value = "desc", conflicts_with = "preset")]
    pub order: SortOrder,

    /// Named sort order
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for SortDirection {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Self::Asc,
            SortOrder::Desc => Self::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PresetArg {
    PriceAsc,
    PriceDesc,
    NameAsc,
    Recent,
}

impl From<PresetArg> for SortPreset {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::PriceAsc => Self::PriceAsc,
            PresetArg::PriceDesc => Self::PriceDesc,
            PresetArg::NameAsc => Self::NameAsc,
            PresetArg::Recent => Self::Recent,
        }
    }
}

/// JSON body for create and update, inline or from a file.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Inline JSON body
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Read the JSON body from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  THEME / CONFIG / COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ThemeArgs {
    #[command(subcommand)]
    pub command: ThemeCommand,
}

#[derive(Debug, Subcommand)]
pub enum ThemeCommand {
    /// Print the current theme
    Show,

    /// Switch between light and dark
    Toggle,

    /// Set the theme explicitly
    Set {
        #[arg(value_enum)]
        theme: ThemeArg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => Self::Light,
            ThemeArg::Dark => Self::Dark,
        }
    }
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Write the resolved configuration to the config file
    Init,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
