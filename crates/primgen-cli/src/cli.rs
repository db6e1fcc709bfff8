//! CLI argument definitions for primgen.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use primgen_model::LoadState;

#[derive(Parser)]
#[command(
    name = "primgen",
    version,
    about = "Resolve which generated modules and features are enabled per type instantiation",
    long_about = "Resolve which generated modules and features are enabled per type instantiation.\n\n\
                  Reads a graph descriptor (TOML) and optional nested settings (JSON or TOML),\n\
                  propagates implied requirements and reports settings that contradict each other."
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

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include the emitting module in log lines.
    #[arg(long = "log-target", global = true)]
    pub log_target: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the built-in type paths.
    Types,

    /// Resolve every instantiation and print the decisions.
    Resolve(ResolveArgs),

    /// Propagate and validate settings, printing any conflicts.
    Check(InputArgs),

    /// Write a settings template holding the current decisions.
    Template(TemplateArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// Graph descriptor (TOML).
    #[arg(long = "graph", value_name = "PATH")]
    pub graph: PathBuf,

    /// Nested settings tree (.json or .toml).
    #[arg(long = "settings", value_name = "PATH")]
    pub settings: Option<PathBuf>,

    /// Comma-separated type paths to instantiate (default: all built-in types).
    #[arg(long = "types", value_name = "TYPES", value_delimiter = ',')]
    pub types: Vec<String>,

    /// Decision for nodes nothing has decided.
    #[arg(long = "fallback", value_enum, default_value = "required")]
    pub fallback: FallbackArg,
}

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Exit successfully even when settings conflict.
    #[arg(long = "allow-conflicts")]
    pub allow_conflicts: bool,

    /// Also print the decision for every node.
    #[arg(long = "nodes")]
    pub show_nodes: bool,
}

#[derive(Args)]
pub struct TemplateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output file (default: stdout).
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FallbackArg {
    /// Undecided nodes are enabled.
    Required,
    /// Undecided nodes are disabled (opt-in).
    Rejected,
}

impl From<FallbackArg> for LoadState {
    fn from(value: FallbackArg) -> Self {
        match value {
            FallbackArg::Required => LoadState::Required,
            FallbackArg::Rejected => LoadState::Rejected,
        }
    }
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
