//! CLI argument definitions for Parade.

use chrono::{DateTime, FixedOffset};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Version string with the commit and build time baked in by build.rs.
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("PARADE_GIT_COMMIT"),
    " ",
    env!("PARADE_BUILD_TIMESTAMP"),
    ")"
);

/// Parade - derived views over issue, agent and workflow snapshots.
///
/// Run `parade` to see the issue lifecycle groups, then `parade focus` for
/// what to work on next.
#[derive(Parser, Debug)]
#[command(name = "parade")]
#[command(author, version, long_version = LONG_VERSION, about = "Derived views for an issue and agent dashboard", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Emit log lines as JSON (filter with PARADE_LOG)
    #[arg(long = "log-json", global = true)]
    pub log_json: bool,

    /// Issue snapshot (JSON array or JSONL). Falls back to PARADE_ISSUES,
    /// then config.kdl, then .beads/issues.jsonl
    #[arg(long = "issues", global = true, value_name = "PATH")]
    pub issues: Option<PathBuf>,

    /// Operator identity for the focus list. Falls back to PARADE_USER
    #[arg(long = "user", global = true, value_name = "NAME")]
    pub user: Option<String>,

    /// Dependency type that gates work (repeatable, replaces the configured set)
    #[arg(long = "blocking-type", global = true, value_name = "TYPE")]
    pub blocking_types: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Group issues by lifecycle: rolling, lined up, stalled, past the stand (default)
    #[command(visible_alias = "groups")]
    Parade,

    /// Capped "what next" list: my work, then ready, then blocked
    Focus {
        /// Maximum number of ready items
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        ready_cap: Option<u16>,

        /// Maximum number of blocked items
        #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
        blocked_cap: Option<u16>,
    },

    /// Dependency evaluation for one issue
    Deps {
        /// Issue ID (e.g., pa-a1b2)
        id: String,
    },

    /// Workflow graph rows, critical path and active step
    Dag {
        /// Workflow graph JSON file
        file: PathBuf,
    },

    /// Anomalies in an agent runtime snapshot
    Problems {
        /// Agent snapshot JSON file
        agents_file: PathBuf,
    },

    /// Throughput for today and this week
    Velocity {
        #[command(flatten)]
        runtime: RuntimeArgs,
    },

    /// Status changes since the last run
    ///
    /// Previously seen statuses are kept in a JSON state file. The first run
    /// only records a baseline.
    Changes {
        /// State file holding previously seen statuses
        #[arg(long, value_name = "FILE")]
        state: PathBuf,
    },

    /// Every derived view in one document
    Summary {
        #[command(flatten)]
        runtime: RuntimeArgs,

        /// Workflow graph JSON file
        #[arg(long, value_name = "FILE")]
        dag: Option<PathBuf>,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Optional orchestrator snapshots and reference time.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RuntimeArgs {
    /// Agent snapshot JSON file
    #[arg(long, value_name = "FILE")]
    pub agents: Option<PathBuf>,

    /// Cost snapshot JSON file
    #[arg(long, value_name = "FILE")]
    pub costs: Option<PathBuf>,

    /// Reference time (RFC 3339); day and week boundaries use its offset.
    /// Defaults to the local clock
    #[arg(long, value_name = "TIME", value_parser = parse_rfc3339)]
    pub now: Option<DateTime<FixedOffset>>,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show resolved configuration with the source of each value
    Show,

    /// Print the config file location
    Path,
}

fn parse_rfc3339(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(s).map_err(|e| format!("invalid RFC 3339 time '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "parade",
            "focus",
            "-H",
            "--user",
            "alice",
            "--blocking-type",
            "blocks",
            "--blocking-type",
            "parent-child",
        ])
        .unwrap();
        assert!(cli.human_readable);
        assert_eq!(cli.user.as_deref(), Some("alice"));
        assert_eq!(cli.blocking_types, vec!["blocks", "parent-child"]);
        assert!(matches!(cli.command, Some(Commands::Focus { .. })));
    }

    #[test]
    fn test_groups_alias() {
        let cli = Cli::try_parse_from(["parade", "groups"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Parade)));
    }

    #[test]
    fn test_focus_cap_must_be_positive() {
        assert!(Cli::try_parse_from(["parade", "focus", "--ready-cap", "0"]).is_err());
        assert!(Cli::try_parse_from(["parade", "focus", "--blocked-cap", "2"]).is_ok());
    }

    #[test]
    fn test_now_parsing() {
        let cli = Cli::try_parse_from(["parade", "velocity", "--now", "2026-03-11T10:00:00+02:00"]).unwrap();
        match cli.command {
            Some(Commands::Velocity { runtime }) => {
                assert_eq!(runtime.now.unwrap().offset().local_minus_utc(), 7200);
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(Cli::try_parse_from(["parade", "velocity", "--now", "yesterday"]).is_err());
    }
}
