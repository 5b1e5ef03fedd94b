//! Command-line argument parsing

use crate::commands::Command;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// zapret strategy tester
///
/// Applies each candidate zapret strategy in turn, probes a list of targets
/// through it, ranks the strategies and keeps the one you pick. The original
/// configuration is restored unless a strategy is kept.
#[derive(Parser, Debug)]
#[command(name = "zst")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,

    // Legacy invocation: `zst <strategies.json> <hostlist> [-t N]`

    /// Strategy list (JSON object: name -> config path)
    #[arg(value_name = "STRATEGIES")]
    pub strategies: Option<PathBuf>,

    /// Target list (one host or IPv4 per line)
    #[arg(value_name = "HOSTLIST")]
    pub hostlist: Option<PathBuf>,

    /// Number of concurrent probes
    #[arg(short = 't', long, value_name = "N")]
    pub threads: Option<usize>,

    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output format for logs
    #[arg(long, value_enum, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Run in quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text
    Text,
    /// JSON format
    Json,
    /// Compact format
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_positionals() {
        let args = Args::parse_from(["zst", "strategies.json", "hosts.txt", "-t", "64"]);
        assert!(args.command.is_none());
        assert_eq!(args.strategies, Some(PathBuf::from("strategies.json")));
        assert_eq!(args.hostlist, Some(PathBuf::from("hosts.txt")));
        assert_eq!(args.threads, Some(64));
    }

    #[test]
    fn test_subcommand() {
        let args = Args::parse_from(["zst", "run", "s.json", "h.txt", "--auto-apply"]);
        match args.command {
            Some(Command::Run(run)) => {
                assert!(run.auto_apply);
                assert_eq!(run.hostlist, PathBuf::from("h.txt"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_verbose() {
        let args = Args::parse_from(["zst", "-v"]);
        assert_eq!(args.verbose, 1);

        let args = Args::parse_from(["zst", "-vvv"]);
        assert_eq!(args.verbose, 3);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::parse_from(["zst", "probe", "h.txt", "-q", "--log-format", "json"]);
        assert!(args.quiet);
        assert_eq!(args.log_format, LogFormat::Json);
    }
}
