//! CLI structure and command definitions
//!
//! Defines the command-line interface using clap:
//! 1. Profile management (`profile` commands)
//! 2. The generic list contract (`list <resource>`)
//! 3. Example workflows (`example` commands)

use clap::{Parser, Subcommand};

use crate::output;

pub mod example;
pub mod list;

pub use example::*;
pub use list::*;

/// Scalr management CLI
#[derive(Parser, Debug)]
#[command(name = "scalrctl")]
#[command(version, about = "Scalr management CLI for workspaces, environments, teams and users")]
#[command(long_about = "
Scalr management CLI for workspaces, environments, teams and users

EXAMPLES:
    # Set up a profile
    scalrctl profile set work --address https://example.scalr.io --token TOKEN

    # List one page of workspaces in an environment
    scalrctl list workspaces --environment env-1 --page-size 20

    # Walk every page of users as JSON
    scalrctl list users --all -o json

    # Run the workspace lifecycle example
    scalrctl example workspace --environment env-1

Without a profile, SCALR_ADDRESS and SCALR_TOKEN are used directly.

For more help on a specific command, run:
    scalrctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "SCALRCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "SCALRCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Deadline in seconds for the whole command
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Automatically choose format based on command and context
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Human-readable table format
    Table,
}

impl OutputFormat {
    /// Concrete format, with `Auto` meaning `fallback`
    pub fn resolve(self, fallback: output::OutputFormat) -> output::OutputFormat {
        match self {
            OutputFormat::Auto => fallback,
            OutputFormat::Json => output::OutputFormat::Json,
            OutputFormat::Yaml => output::OutputFormat::Yaml,
            OutputFormat::Table => output::OutputFormat::Table,
        }
    }

    /// Whether the caller asked for structured output
    pub fn is_structured(self) -> bool {
        matches!(self, OutputFormat::Json | OutputFormat::Yaml)
    }
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    Profile(ProfileCommands),

    /// List one page of a resource collection
    #[command(visible_alias = "ls")]
    #[command(after_help = "EXAMPLES:
    # First page of teams in an account
    scalrctl list teams --account acc-1

    # Third page of ten users
    scalrctl list users --page 3 --page-size 10

    # Account users with the user and teams embedded
    scalrctl list account-users --account acc-1 --include user,teams

    # Every environment, following pages until the last one
    scalrctl list environments --all
")]
    List(ListArgs),

    /// Example workflows: create, update and delete resources step by step
    #[command(subcommand, visible_alias = "ex")]
    Example(ExampleCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,

    /// Generate shell completions
    #[command(visible_alias = "comp")]
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    /// Bourne Again Shell
    Bash,
    /// Z Shell
    Zsh,
    /// Friendly Interactive Shell
    Fish,
    /// PowerShell
    #[value(name = "powershell", alias = "power-shell")]
    PowerShell,
    /// Elvish
    Elvish,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    scalrctl profile set work --address https://example.scalr.io --token TOKEN

    # Send the preview profile header with every request
    scalrctl profile set preview --address https://example.scalr.io \\
        --token TOKEN --header 'Prefer=profile=preview'

    # Reference an environment variable instead of storing the token
    scalrctl profile set ci --address https://example.scalr.io --token '${SCALR_CI_TOKEN}'
")]
    Set {
        /// Profile name
        name: String,

        /// Service address
        #[arg(long, default_value = scalr_core::client::DEFAULT_ADDRESS)]
        address: String,

        /// Bearer token
        #[arg(long)]
        token: String,

        /// API root path
        #[arg(long, default_value = scalr_core::client::DEFAULT_BASE_PATH)]
        base_path: String,

        /// Extra header sent with every request, as NAME=VALUE (repeatable)
        #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Make this the default profile
        #[arg(long)]
        default: bool,

        /// Store the token in the OS keyring instead of the config file
        #[cfg(feature = "secure-storage")]
        #[arg(long)]
        use_keyring: bool,
    },

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "del", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name to use when --profile is not given
        name: String,
    },
}

/// Parse a `NAME=VALUE` header argument
pub fn parse_header(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid header '{}': expected NAME=VALUE", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("invalid header '{}': name is empty", s));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn header_splits_on_first_equals() {
        assert_eq!(
            parse_header("Prefer=profile=preview").unwrap(),
            ("Prefer".to_string(), "profile=preview".to_string())
        );
        assert!(parse_header("no-separator").is_err());
        assert!(parse_header("=value").is_err());
    }

    #[test]
    fn auto_output_falls_back() {
        assert_eq!(
            OutputFormat::Auto.resolve(output::OutputFormat::Table),
            output::OutputFormat::Table
        );
        assert_eq!(
            OutputFormat::Yaml.resolve(output::OutputFormat::Table),
            output::OutputFormat::Yaml
        );
        assert!(OutputFormat::Json.is_structured());
        assert!(!OutputFormat::Auto.is_structured());
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "scalrctl", "list", "users", "-o", "json", "--timeout", "5", "-vv",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(cli.timeout, Some(5));
        assert_eq!(cli.verbose, 2);
    }
}
