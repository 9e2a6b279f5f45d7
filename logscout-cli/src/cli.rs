//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Config file used when `--config` is not given. Missing is not an error.
pub const DEFAULT_CONFIG_PATH: &str = "logscout.toml";

/// logscout -- recommend the most likely log format for a sample line.
///
/// Use `logscout <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "logscout", version, about, long_about = None)]
pub struct Cli {
    /// Path to the logscout.toml configuration file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(short, long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table / text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Recommend formats for a single log line.
    Recommend(RecommendArgs),

    /// Analyze the lines of a log file and tally the best formats.
    Analyze(AnalyzeArgs),

    /// Inspect and validate the format catalog.
    Formats(FormatsArgs),

    /// Manage configuration.
    Config(ConfigArgs),
}

/// Extra format definition sources, loaded before the configured ones.
#[derive(Args, Debug, Default, Clone)]
pub struct FormatSourceArgs {
    /// Format definition file or directory (.yml, .yaml, .json). Repeatable.
    #[arg(long = "formats", value_name = "PATH")]
    pub formats: Vec<PathBuf>,
}

/// Ranking options shared by `recommend` and `analyze`.
#[derive(Args, Debug, Default, Clone)]
pub struct RankingArgs {
    /// Maximum number of recommendations per line.
    #[arg(short = 'n', long = "top", value_name = "N")]
    pub top: Option<usize>,

    /// Minimum confidence (0-100).
    #[arg(short = 'm', long = "min-confidence", value_name = "MIN")]
    pub min_confidence: Option<f64>,

    /// Also rank overly generic catch-all formats.
    #[arg(long)]
    pub include_generic: bool,
}

// ---- recommend ----

/// Recommend formats for a single log line.
#[derive(Args, Debug)]
pub struct RecommendArgs {
    /// The log line to classify.
    pub line: String,

    #[command(flatten)]
    pub ranking: RankingArgs,

    /// Only consider formats in this group.
    #[arg(short, long)]
    pub group: Option<String>,

    /// Only consider formats from this vendor.
    #[arg(long)]
    pub vendor: Option<String>,

    #[command(flatten)]
    pub sources: FormatSourceArgs,
}

// ---- analyze ----

/// Analyze the lines of a log file.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Log file to analyze (`-` reads stdin).
    pub file: PathBuf,

    /// Maximum number of non-empty lines to read (default: recommend.batch_max_lines).
    #[arg(long, value_name = "N")]
    pub max_lines: Option<usize>,

    #[command(flatten)]
    pub ranking: RankingArgs,

    #[command(flatten)]
    pub sources: FormatSourceArgs,
}

// ---- formats ----

/// Inspect and validate the format catalog.
#[derive(Args, Debug)]
pub struct FormatsArgs {
    #[command(subcommand)]
    pub action: FormatsAction,
}

#[derive(Subcommand, Debug)]
pub enum FormatsAction {
    /// List the formats in the catalog.
    List {
        /// Filter by group.
        #[arg(short, long)]
        group: Option<String>,

        /// Filter by vendor.
        #[arg(long)]
        vendor: Option<String>,

        #[command(flatten)]
        sources: FormatSourceArgs,
    },
    /// Show per-group and per-vendor format counts.
    Stats {
        #[command(flatten)]
        sources: FormatSourceArgs,
    },
    /// Compile every format and test it against its sample line.
    Validate {
        #[command(flatten)]
        sources: FormatSourceArgs,
    },
}

// ---- config ----

/// Manage logscout configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, patterns, recommend).
        section: Option<String>,
    },
}
