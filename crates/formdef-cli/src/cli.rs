//! CLI argument definitions for the questionnaire compiler.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "formdef",
    version,
    about = "Questionnaire definition compiler - convert tabular form specifications to questionnaire documents",
    long_about = "Compile flat, spreadsheet-authored form specifications into nested\n\
                  questionnaire documents (sections, questions, answer options,\n\
                  visibility conditions, matrices, repeated sub-forms).\n\n\
                  Compilation is best-effort: malformed rows degrade to safe defaults\n\
                  and are reported for manual review."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
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
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile one or more form-specification tables to JSON documents.
    Compile(CompileArgs),

    /// Show the active column-role to header mapping.
    Headers(HeadersArgs),
}

#[derive(Parser)]
pub struct CompileArgs {
    /// Paths to the CSV form specifications.
    #[arg(value_name = "TABLE", required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output directory for generated documents (default: next to each input).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// JSON file overriding the default column headers.
    #[arg(long = "headers", value_name = "PATH")]
    pub headers: Option<PathBuf>,

    /// Mark generated questionnaires as paginated.
    #[arg(long = "paginate")]
    pub paginate: bool,

    /// Required subject type for generated questionnaires (repeatable).
    #[arg(long = "subject-type", value_name = "TYPE")]
    pub subject_types: Vec<String>,

    /// Cap the number of filled forms per subject.
    #[arg(long = "max-per-subject", value_name = "N")]
    pub max_per_subject: Option<u32>,

    /// Do not default questions to a single answer.
    #[arg(long = "multi-answer")]
    pub multi_answer: bool,

    /// Compile and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Parser)]
pub struct HeadersArgs {
    /// JSON file overriding the default column headers.
    #[arg(long = "headers", value_name = "PATH")]
    pub headers: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
