//! Clap derive structures for the `shakwa` CLI.
//!
//! Defines the command tree, global flags, and shared value enums.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// shakwa -- complaint-platform notifications in the terminal
#[derive(Debug, Parser)]
#[command(
    name = "shakwa",
    version,
    about = "Follow complaint-platform notifications from the command line",
    long_about = "Read, acknowledge, and live-follow your notifications on the complaints \
        platform.\n\n\
        One-shot commands talk to the REST API; `watch` keeps a push connection open \
        and shows each new notification as it arrives.",
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
    /// Platform profile to use
    #[arg(long, short = 'p', env = "SHAKWA_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Application origin, e.g. https://complaints.example.gov (overrides profile)
    #[arg(long, env = "SHAKWA_ORIGIN", global = true)]
    pub origin: Option<String>,

    /// Bearer token (overrides profile and keyring)
    #[arg(long, env = "SHAKWA_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Interface language for notification text
    #[arg(long, short = 'L', env = "SHAKWA_LOCALE", global = true)]
    pub locale: Option<LocaleArg>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "SHAKWA_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept invalid TLS certificates (staging servers)
    #[arg(long, short = 'k', env = "SHAKWA_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "SHAKWA_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Value Enums ──────────────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LocaleArg {
    /// Arabic (right-to-left)
    Ar,
    /// English
    En,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List notifications, newest first
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show the unread notification count
    Unread,

    /// Mark a notification as read
    Read(IdArgs),

    /// Mark every notification as read
    ReadAll,

    /// Delete a notification
    #[command(alias = "rm")]
    Delete(IdArgs),

    /// Print a notification's link and mark it read
    Open(IdArgs),

    /// Stay connected and show notifications as they arrive
    Watch(WatchArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Notification Arguments ───────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Number of notifications to skip
    #[arg(long, default_value = "0")]
    pub skip: u32,

    /// Page size (defaults to the profile's page_size)
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Only show unread notifications
    #[arg(long, short = 'u')]
    pub unread: bool,
}

#[derive(Debug, Args)]
pub struct IdArgs {
    /// Notification ID
    pub id: String,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Do not print the unread summary on connect
    #[arg(long)]
    pub no_summary: bool,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or replace a profile
    Init(InitArgs),

    /// Show the current configuration (tokens masked)
    Show,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a bearer token for the active profile
    SetToken(SetTokenArgs),

    /// Print the config file path
    Path,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Application origin, e.g. https://complaints.example.gov
    #[arg(long)]
    pub origin: String,

    /// Profile name (defaults to --profile or "default")
    #[arg(long)]
    pub name: Option<String>,

    /// REST prefix under the origin
    #[arg(long)]
    pub api_path: Option<String>,

    /// Push endpoint path under the origin
    #[arg(long)]
    pub push_path: Option<String>,

    /// Environment variable that holds the bearer token
    #[arg(long)]
    pub token_env: Option<String>,

    /// Replace an existing profile of the same name
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct SetTokenArgs {
    /// Save the token in the config file instead of the system keyring
    #[arg(long)]
    pub plaintext: bool,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
