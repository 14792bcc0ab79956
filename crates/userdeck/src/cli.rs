//! Clap derive structures for the `userdeck` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// userdeck -- manage users and profiles from the command line
#[derive(Debug, Parser)]
#[command(
    name = "userdeck",
    version,
    about = "Manage users from the command line",
    long_about = "List, filter, create, edit and remove users through the userdeck API.\n\n\
        Servers are configured in config.toml (see `userdeck config init`), or\n\
        pointed at directly with --url / USERDECK_API_URL.",
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
    /// Configured server to use
    #[arg(long, short = 'S', env = "USERDECK_SERVER", global = true)]
    pub server: Option<String>,

    /// API URL (overrides the configured server)
    #[arg(long, short = 'u', env = "USERDECK_API_URL", global = true)]
    pub url: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "USERDECK_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "USERDECK_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one id per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List, inspect and modify users
    #[command(alias = "u")]
    Users(UsersArgs),

    /// List user profiles (roles)
    #[command(alias = "p")]
    Profiles(ProfilesArgs),

    /// Manage CLI configuration and servers
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  USERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List one page of users
    #[command(alias = "ls")]
    List {
        /// Page number, starting at 1
        #[arg(long, default_value = "1")]
        page: u32,

        /// Users per page [default: configured page size]
        #[arg(long, short = 'l')]
        limit: Option<u32>,

        /// Only users holding this profile (by name), or "all"
        #[arg(long, short = 'P')]
        profile: Option<String>,
    },

    /// Show a single user
    Get {
        /// User id
        id: String,
    },

    /// Create a user
    Create {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        /// Profile name or id
        #[arg(long, short = 'P')]
        profile: Option<String>,

        /// Create the user deactivated
        #[arg(long)]
        inactive: bool,
    },

    /// Change fields of an existing user
    Update {
        /// User id
        id: String,

        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Profile name or id
        #[arg(long, short = 'P')]
        profile: Option<String>,
    },

    /// Delete a user
    #[command(alias = "rm")]
    Delete {
        /// User id
        id: String,
    },

    /// Mark a user active
    Activate {
        /// User id
        id: String,
    },

    /// Mark a user inactive
    Deactivate {
        /// User id
        id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PROFILES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ProfilesArgs {
    #[command(subcommand)]
    pub command: ProfilesCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProfilesCommand {
    /// List all profiles
    #[command(alias = "ls")]
    List,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create initial config file with guided setup
    Init,

    /// Display current resolved configuration
    Show,

    /// List configured servers
    Servers,

    /// Set the default server
    Use {
        /// Server name to set as default
        name: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
