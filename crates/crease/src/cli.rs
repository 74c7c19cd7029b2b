//! Clap derive structures for the `crease` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crease_core::{ListParams, Resource, SortOrder};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// crease -- administer the cricket league from the command line
#[derive(Debug, Parser)]
#[command(
    name = "crease",
    version,
    about = "Administer cricket-league teams, tournaments, players and more",
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
    /// Backend profile to use
    #[arg(long, short = 'p', env = "CREASE_PROFILE", global = true)]
    pub profile: Option<String>,

    /// API base URL (overrides profile)
    #[arg(long, short = 'u', env = "CREASE_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token (overrides profile credentials)
    #[arg(long, env = "CREASE_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "CREASE_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Request timeout in seconds
    #[arg(long, env = "CREASE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Retries for network errors and 5xx responses
    #[arg(long, global = true)]
    pub retries: Option<u32>,
}

// ── Output Enum ──────────────────────────────────────────────────────

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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage teams
    #[command(alias = "t")]
    Teams(ResourceArgs),

    /// Manage tournaments
    #[command(alias = "tour")]
    Tournaments(ResourceArgs),

    /// Manage players
    #[command(alias = "p")]
    Players(ResourceArgs),

    /// Manage fixtures (matches)
    #[command(alias = "matches")]
    Fixtures(ResourceArgs),

    /// Manage sponsors
    Sponsors(ResourceArgs),

    /// Manage voting polls
    #[command(alias = "polls")]
    Voting(ResourceArgs),

    /// Manage admin users
    Users(ResourceArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

impl Command {
    /// The league collection a resource command targets.
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Self::Teams(_) => Some(Resource::Teams),
            Self::Tournaments(_) => Some(Resource::Tournaments),
            Self::Players(_) => Some(Resource::Players),
            Self::Fixtures(_) => Some(Resource::Fixtures),
            Self::Sponsors(_) => Some(Resource::Sponsors),
            Self::Voting(_) => Some(Resource::Voting),
            Self::Users(_) => Some(Resource::Users),
            Self::Config(_) | Self::Completions(_) => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  RESOURCES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List records
    #[command(alias = "ls")]
    List(ListArgs),

    /// Search records (at least 2 characters)
    Search {
        /// Search term
        term: String,

        #[command(flatten)]
        list: ListArgs,
    },

    /// Show one record
    Get {
        /// Record id
        id: String,
    },

    /// Create a record from JSON
    Create(PayloadArgs),

    /// Replace a record with JSON
    Update {
        /// Record id
        id: String,

        #[command(flatten)]
        payload: PayloadArgs,
    },

    /// Delete a record
    #[command(alias = "rm")]
    Delete {
        /// Record id
        id: String,
    },
}

/// Shared pagination and filtering arguments for list commands.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Page number
    #[arg(long)]
    pub page: Option<u32>,

    /// Max results per page
    #[arg(long, short = 'l')]
    pub limit: Option<u32>,

    /// Pagination offset
    #[arg(long)]
    pub offset: Option<u32>,

    /// Sort field
    #[arg(long, short = 's')]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Extra query filter, repeatable (e.g. --filter tournament=3)
    #[arg(long, short = 'f', value_parser = parse_filter)]
    pub filter: Vec<(String, String)>,
}

impl ListArgs {
    pub fn to_params(&self) -> ListParams {
        let mut params = ListParams::new();
        for (key, value) in &self.filter {
            params = params.filter(key.clone(), value.clone());
        }
        if let Some(page) = self.page {
            params = params.page(page);
        }
        if let Some(limit) = self.limit {
            params = params.limit(limit);
        }
        if let Some(offset) = self.offset {
            params = params.offset(offset);
        }
        if let Some(ref field) = self.sort {
            let order = if self.desc { SortOrder::Desc } else { SortOrder::Asc };
            params = params.sort(field.clone(), order);
        }
        params
    }
}

fn parse_filter(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

/// Request body source for create/update.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct PayloadArgs {
    /// Inline JSON object
    #[arg(long, short = 'd')]
    pub data: Option<String>,

    /// Read the JSON object from a file
    #[arg(long, short = 'F')]
    pub from_file: Option<PathBuf>,
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

    /// Print the config file path
    Path,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a bearer token for a profile
    SetToken {
        /// Write the token file instead of the system keyring
        #[arg(long)]
        file: bool,
    },

    /// Remove stored tokens for a profile (keyring and token file)
    ClearToken,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn filters_parse_as_pairs() {
        assert_eq!(
            parse_filter("tournament=3").unwrap(),
            ("tournament".to_owned(), "3".to_owned())
        );
        assert!(parse_filter("nokey").is_err());
        assert!(parse_filter("=v").is_err());
    }

    #[test]
    fn list_args_flatten_to_query() {
        let cli = Cli::try_parse_from([
            "crease", "teams", "list", "--limit", "5", "--sort", "name", "--desc", "-f", "city=Pune",
        ])
        .unwrap();
        let Command::Teams(ResourceArgs {
            command: ResourceCommand::List(list),
        }) = cli.command
        else {
            panic!("expected teams list");
        };

        let query = list.to_params().into_query();
        assert_eq!(query.get("limit").map(String::as_str), Some("5"));
        assert_eq!(query.get("order").map(String::as_str), Some("desc"));
        assert_eq!(query.get("city").map(String::as_str), Some("Pune"));
    }
}
