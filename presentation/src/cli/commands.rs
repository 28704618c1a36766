//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for review results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Summary, every individual review and the aggregated review
    Full,
    /// Only the aggregated review
    Final,
    /// JSON output
    Json,
}

/// CLI arguments for prismatic
#[derive(Parser, Debug)]
#[command(name = "prismatic")]
#[command(author, version, about = "Multi-agent code review - parallel reviewers, one aggregated verdict")]
#[command(long_about = r#"
Prismatic reviews a code change with a panel of LLM agents.

The process has up to three phases:
1. Summary: A summarizer agent condenses the change (skip with --no-summary)
2. Parallel Review: Security, performance, clarity and test reviewers run concurrently
3. Aggregation: An aggregator merges the reviews into one prioritized report

Reviewers may read files under --workdir with read-only tools.

Configuration files are loaded from (in priority order):
1. --config <path>        Explicit config file
2. ./prismatic.toml       Project-level config (or ./.prismatic.toml)
3. ~/.config/prismatic/config.toml   Global config

Environment variables prefixed with PRISMATIC_ override every file,
e.g. PRISMATIC_RETRY__MAX_ATTEMPTS=3.

Example:
  git diff main | prismatic
  prismatic --input change.diff --output full
  prismatic --input change.diff --conversation-log review.jsonl -vv
"#)]
pub struct Cli {
    /// File holding the change to review ("-" or omitted reads stdin)
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Directory the read-only file tools are rooted at
    #[arg(short = 'C', long, value_name = "DIR")]
    pub workdir: Option<PathBuf>,

    /// Skip the summary phase
    #[arg(long)]
    pub no_summary: bool,

    /// Append every model turn and tool call to this JSONL file
    #[arg(long, value_name = "PATH")]
    pub conversation_log: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "final")]
    pub output: OutputFormat,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Whether the change should be read from stdin
    pub fn reads_stdin(&self) -> bool {
        match &self.input {
            None => true,
            Some(path) => path.as_os_str() == "-",
        }
    }

    /// tracing filter directive matching the verbosity flag
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
