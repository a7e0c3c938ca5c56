//! CLI argument parsing for Flakehound

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::history::DEFAULT_MAX_HISTORY_RUNS;

/// Output format for analysis reports
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON report envelope for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "flakehound")]
#[command(version)]
#[command(about = "Test stability analytics over rolling run histories", long_about = None)]
pub struct Cli {
    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge sharded history files into one retention-capped document
    Merge {
        /// Source history files (missing or malformed shards are skipped)
        #[arg(required = true, value_name = "SOURCE")]
        sources: Vec<PathBuf>,

        /// Destination for the reconciled history
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Maximum runs retained per collection
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_HISTORY_RUNS)]
        max_runs: usize,
    },

    /// Analyze one run's results against the recorded history
    Analyze {
        /// Run input file: {"runId", "timestamp", "tests": [...]}
        #[arg(value_name = "RESULTS")]
        results: PathBuf,

        /// History file to read (and optionally update)
        #[arg(long, value_name = "FILE", default_value = "test-history.json")]
        history: PathBuf,

        /// Persist the analyzed run into the history
        #[arg(long)]
        update_history: bool,

        /// Derive drift bounds from baseline magnitude
        #[arg(long)]
        adaptive: bool,

        /// Output format (text or json)
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Maximum runs retained per collection
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_HISTORY_RUNS)]
        max_runs: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_merge() {
        let cli = Cli::parse_from([
            "flakehound",
            "merge",
            "shard-1.json",
            "shard-2.json",
            "-o",
            "merged.json",
        ]);
        match cli.command {
            Command::Merge {
                sources,
                output,
                max_runs,
            } => {
                assert_eq!(sources.len(), 2);
                assert_eq!(output, PathBuf::from("merged.json"));
                assert_eq!(max_runs, DEFAULT_MAX_HISTORY_RUNS);
            }
            other => panic!("expected merge command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_merge_requires_sources() {
        let parsed = Cli::try_parse_from(["flakehound", "merge", "-o", "merged.json"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_cli_parses_analyze_defaults() {
        let cli = Cli::parse_from(["flakehound", "analyze", "run.json"]);
        match cli.command {
            Command::Analyze {
                results,
                history,
                update_history,
                adaptive,
                max_runs,
                ..
            } => {
                assert_eq!(results, PathBuf::from("run.json"));
                assert_eq!(history, PathBuf::from("test-history.json"));
                assert!(!update_history);
                assert!(!adaptive);
                assert_eq!(max_runs, DEFAULT_MAX_HISTORY_RUNS);
            }
            other => panic!("expected analyze command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_analyze_flags() {
        let cli = Cli::parse_from([
            "flakehound",
            "analyze",
            "run.json",
            "--update-history",
            "--adaptive",
            "--format",
            "json",
            "--max-runs",
            "25",
        ]);
        match cli.command {
            Command::Analyze {
                update_history,
                adaptive,
                max_runs,
                ..
            } => {
                assert!(update_history);
                assert!(adaptive);
                assert_eq!(max_runs, 25);
            }
            other => panic!("expected analyze command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_debug_default_false() {
        let cli = Cli::parse_from(["flakehound", "analyze", "run.json"]);
        assert!(!cli.debug);
    }
}
