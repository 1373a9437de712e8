//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for agent-lab
#[derive(Parser, Debug)]
#[command(name = "agent-lab")]
#[command(author, version, about = "Tool-calling agent lab with signature-adaptive construction")]
#[command(long_about = r#"
agent-lab builds a tool-calling agent against whichever orchestrator
constructor revision is configured, then runs queries through it with
bounded exponential backoff on rate limits.

Dry-run is on by default: nothing is sent until you pass --live or set
`agent.dry_run = false`.

Configuration files are loaded from (in priority order):
1. AGENT_LAB_* environment variables (AGENT_LAB_RETRY__MAX_ATTEMPTS=3)
2. --config <path>     Explicit config file
3. ./agent-lab.toml    Project-level config
4. ~/.config/agent-lab/config.toml   Global config

Example:
  agent-lab run --live
  agent-lab run --live "What is 25 * 4 + 10?" "Reverse the string 'abc'"
  agent-lab eval "2 ** 10 // 3"
  agent-lab probe
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Write a JSONL interaction transcript to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Never call the API (overrides config)
    #[arg(long, global = true, conflicts_with = "live")]
    pub dry_run: bool,

    /// Call the API (overrides config)
    #[arg(long, global = true)]
    pub live: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run queries through the agent (the built-in examples if none given)
    Run {
        /// Queries to run, in order
        #[arg(value_name = "QUERY")]
        queries: Vec<String>,
    },

    /// Evaluate an arithmetic expression locally
    Eval {
        #[arg(value_name = "EXPR")]
        expression: String,
    },

    /// List the built-in tools
    Tools,

    /// Check whether the API is currently rate-limiting you
    Probe,

    /// Show configuration file locations and the effective settings
    ShowConfig,
}

impl Cli {
    /// Dry-run override from the flags, if any
    pub fn dry_run_override(&self) -> Option<bool> {
        if self.dry_run {
            Some(true)
        } else if self.live {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_with_queries() {
        let cli = Cli::parse_from(["agent-lab", "run", "--live", "What is 2+2?", "hi"]);
        assert_eq!(
            cli.command,
            Command::Run {
                queries: vec!["What is 2+2?".into(), "hi".into()]
            }
        );
        assert_eq!(cli.dry_run_override(), Some(false));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["agent-lab", "tools", "-vv", "--no-config"]);
        assert_eq!(cli.command, Command::Tools);
        assert_eq!(cli.verbose, 2);
        assert!(cli.no_config);
        assert_eq!(cli.dry_run_override(), None);
    }

    #[test]
    fn test_eval_and_log_file() {
        let cli = Cli::parse_from([
            "agent-lab",
            "--log-file",
            "/tmp/t.jsonl",
            "eval",
            "25 * 4 + 10",
        ]);
        assert_eq!(
            cli.command,
            Command::Eval {
                expression: "25 * 4 + 10".into()
            }
        );
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/t.jsonl")));
    }

    #[test]
    fn test_dry_run_and_live_conflict() {
        assert!(Cli::try_parse_from(["agent-lab", "run", "--dry-run", "--live"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["agent-lab"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
