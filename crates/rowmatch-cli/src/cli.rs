//! CLI argument definitions for rowmatch.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use rowmatch_cli::types::SwapSpec;

#[derive(Parser)]
#[command(
    name = "rowmatch",
    version,
    about = "Fuzzy record matching between two tabular datasets",
    long_about = "Match each row of an incoming CSV against a reference CSV.\n\n\
                  Cells are compared with exact, fuzzy, partial and token-set strategies\n\
                  in a configurable priority order and combined with uniqueness weights."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow cell values in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match an incoming CSV against a reference CSV.
    Match(MatchArgs),

    /// Profile columns of a CSV: uniqueness, blanks, duplicates.
    Analyze(AnalyzeArgs),

    /// Show or edit the strategy priorities stored in a profile.
    Priority(PriorityArgs),
}

#[derive(Parser)]
pub struct MatchArgs {
    /// CSV whose rows are being matched.
    #[arg(value_name = "INCOMING")]
    pub incoming: PathBuf,

    /// CSV searched for matches.
    #[arg(value_name = "REFERENCE")]
    pub reference: PathBuf,

    /// Matchable columns (default: the profile's columns).
    #[arg(long = "columns", value_name = "COLUMNS", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Reference columns copied into matched incoming rows.
    #[arg(long = "apply", value_name = "COLUMNS", value_delimiter = ',')]
    pub apply: Vec<String>,

    /// Write the augmented incoming dataset to this CSV.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Write a JSON report with settings, weights and per-row results.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Profile to load settings from (default: the user config profile).
    #[arg(long = "profile", value_name = "PATH")]
    pub profile: Option<PathBuf>,

    /// Use the recommended per-column priorities.
    #[arg(long = "recommended")]
    pub recommended: bool,

    #[command(flatten)]
    pub thresholds: ThresholdArgs,

    /// How the candidate pruning threshold is chosen.
    #[arg(long = "pruning", value_enum)]
    pub pruning: Option<PruningArg>,

    /// Which dataset's uniqueness drives the column weights.
    #[arg(long = "weights", value_enum)]
    pub weights: Option<WeightSideArg>,

    /// Worker threads (1 runs sequentially, default: all cores).
    #[arg(long = "jobs", short = 'j', value_name = "N")]
    pub jobs: Option<usize>,

    /// Swap two priority positions for this run, `A:B` or `A:B@column`.
    #[arg(long = "swap", value_name = "SWAP")]
    pub swaps: Vec<SwapSpec>,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

/// Threshold overrides, each in `[0, 1]`.
#[derive(Args)]
pub struct ThresholdArgs {
    #[arg(long = "fuzzy-threshold", value_name = "X")]
    pub fuzzy: Option<f64>,

    #[arg(long = "partial-threshold", value_name = "X")]
    pub partial: Option<f64>,

    #[arg(long = "token-set-threshold", value_name = "X")]
    pub token_set: Option<f64>,

    /// Aggregate score at or above which a single match is accepted.
    #[arg(long = "total-threshold", value_name = "X")]
    pub total: Option<f64>,

    /// Aggregate score below which candidates are discarded.
    #[arg(long = "optimize-threshold", value_name = "X")]
    pub optimize: Option<f64>,
}

#[derive(Parser)]
pub struct AnalyzeArgs {
    /// CSV to profile.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Columns to profile (default: all).
    #[arg(long = "columns", value_name = "COLUMNS", value_delimiter = ',')]
    pub columns: Vec<String>,
}

#[derive(Parser)]
pub struct PriorityArgs {
    #[command(subcommand)]
    pub action: PriorityAction,

    /// Profile to edit (default: the user config profile).
    #[arg(long = "profile", value_name = "PATH", global = true)]
    pub profile: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum PriorityAction {
    /// Print the default list and every column override.
    Show,

    /// Swap two 1-based positions.
    Swap {
        position_a: usize,
        position_b: usize,
        /// Edit this column's override instead of the default list.
        #[arg(long = "column")]
        column: Option<String>,
    },

    /// Restore the default order, or drop one column's override.
    Reset {
        #[arg(long = "column")]
        column: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PruningArg {
    Threshold,
    Auto,
    Disabled,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum WeightSideArg {
    Incoming,
    Reference,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
