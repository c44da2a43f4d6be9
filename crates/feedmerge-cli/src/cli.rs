//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Merge stored event-feed snapshots into one deduplicated stream.
///
/// Inputs are read oldest first. A directory input expands to the snapshot
/// files directly inside it, in file name order.
#[derive(Debug, Parser)]
#[command(name = "feedmerge", version)]
pub struct Cli {
    /// Snapshot files or directories of snapshot files, oldest first.
    #[arg(required = true, value_name = "INPUT")]
    pub inputs: Vec<PathBuf>,

    /// YAML configuration file (defaults to `feedmerge.yaml` if present).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format for merged records.
    #[arg(long, value_enum, default_value_t = OutputFormat::Jsonl)]
    pub format: OutputFormat,

    /// Print per-type event counts instead of the records.
    #[arg(long, conflicts_with = "format")]
    pub types: bool,

    /// Write to this file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// How merged records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One JSON record per line, written as records are merged.
    Jsonl,
    /// A single pretty-printed JSON array.
    Json,
}
