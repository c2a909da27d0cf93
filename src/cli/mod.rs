//! CLI module for rustible-ios
//!
//! This module provides the command-line interface: argument parsing and
//! subcommand handling. Every subcommand works offline on configuration
//! files; nothing is ever sent to a device.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use rustible_ios::modules::network::resource::ResourceState;
use std::path::PathBuf;

/// rustible-ios - Declarative Cisco IOS resource modules
///
/// Parse running-config text into structured facts, render commands from
/// structured config, and preview the commands needed to converge.
#[derive(Parser, Debug, Clone)]
#[command(name = "rustible-ios")]
#[command(author = "Rustible Contributors")]
#[command(version)]
#[command(about = "Declarative Cisco IOS resource modules", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format (overrides the configuration file)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// Path to configuration file
    #[arg(short = 'c', long, global = true, env = "RUSTIBLE_IOS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Json,
    /// YAML
    Yaml,
}

impl OutputFormat {
    /// Parse a format name from configuration, falling back to JSON
    pub fn from_config(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => OutputFormat::Yaml,
            _ => OutputFormat::Json,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the available resource modules
    List,

    /// Parse running-config text into facts (state `parsed`)
    Parse(ParseArgs),

    /// Render commands from structured config (state `rendered`)
    Render(RenderArgs),

    /// Gather facts from a saved running-config (state `gathered`)
    Gather(ParseArgs),

    /// Show the commands that would converge a saved running-config
    Diff(DiffArgs),
}

/// Arguments for parse and gather commands
#[derive(Parser, Debug, Clone)]
pub struct ParseArgs {
    /// Resource module (`ios_vlans` or `vlans`)
    pub resource: String,

    /// File holding running-config text
    pub running_config: PathBuf,
}

/// Arguments for render command
#[derive(Parser, Debug, Clone)]
pub struct RenderArgs {
    /// Resource module (`ios_vlans` or `vlans`)
    pub resource: String,

    /// YAML or JSON file holding the resource config
    pub config: PathBuf,
}

/// Arguments for diff command
#[derive(Parser, Debug, Clone)]
pub struct DiffArgs {
    /// Resource module (`ios_vlans` or `vlans`)
    pub resource: String,

    /// File holding running-config text
    pub running_config: PathBuf,

    /// YAML or JSON file holding the declared (wanted) config
    #[arg(short = 'w', long)]
    pub want: Option<PathBuf>,

    /// Declared state
    #[arg(short = 's', long, default_value = "merged")]
    pub state: ResourceState,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["rustible-ios", "parse", "vlans", "running.cfg"]).unwrap();
        match cli.command {
            Commands::Parse(args) => {
                assert_eq!(args.resource, "vlans");
                assert_eq!(args.running_config, PathBuf::from("running.cfg"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verbosity() {
        let cli = Cli::try_parse_from(["rustible-ios", "-vvvv", "list"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }

    #[test]
    fn test_diff_state() {
        let cli = Cli::try_parse_from([
            "rustible-ios",
            "diff",
            "ios_acls",
            "running.cfg",
            "--want",
            "acls.yml",
            "--state",
            "overridden",
        ])
        .unwrap();
        match cli.command {
            Commands::Diff(args) => assert_eq!(args.state, ResourceState::Overridden),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_state() {
        assert!(Cli::try_parse_from(["rustible-ios", "diff", "vlans", "r.cfg", "-s", "absent"]).is_err());
    }

    #[test]
    fn test_format_from_config() {
        assert_eq!(OutputFormat::from_config("YAML"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_config("anything"), OutputFormat::Json);
    }
}
