//! Command-line entry point for feedmerge.
//!
//! Reads snapshot files (or directories of them) oldest first, merges them
//! into one deduplicated stream and writes it out. Conflicts and per-source
//! statistics are logged to stderr.
//!
//! # Architecture
//!
//! ```text
//! args + feedmerge.yaml --> expand inputs --> MergeEngine --> JSONL / JSON / type counts
//! ```

mod cli;
mod logging;
mod output;

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use feedmerge_core::{expand_inputs, MergeConfig, MergeEngine};

use crate::cli::{Cli, OutputFormat};

/// Configuration file picked up from the working directory when `--config`
/// is not given.
const DEFAULT_CONFIG_FILE: &str = "feedmerge.yaml";

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref())?;
    logging::init(&config.logging);

    info!(
        envelope_field = config.merge.envelope_field,
        id_field = config.merge.id_field,
        equality = ?config.equality.mode,
        ignore_fields = ?config.equality.ignore_fields,
        "configuration loaded"
    );

    let sources = expand_inputs(&cli.inputs, &config.sources.extension)
        .context("failed to resolve inputs")?;
    info!(sources = sources.len(), "merging snapshots");

    let mut out: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut engine = MergeEngine::new(&config);
    let merged = engine.merge(sources);

    let result = if cli.types {
        output::write_type_counts(merged, &mut out)
    } else {
        match cli.format {
            OutputFormat::Jsonl => output::write_jsonl(merged, &mut out),
            OutputFormat::Json => output::write_json_array(merged, &mut out),
        }
    };
    // Records streamed before a failing source must still reach the output.
    let flushed = out.flush().context("failed to flush output");
    let written = result?;
    flushed?;

    info!(records = written, "done");
    Ok(())
}

/// Load configuration from an explicit path, the default file if present,
/// or defaults plus environment overrides.
fn load_config(explicit: Option<&Path>) -> anyhow::Result<MergeConfig> {
    let path = explicit.or_else(|| Some(Path::new(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file()));

    path.map_or_else(
        || MergeConfig::parse("").context("invalid configuration"),
        |path| {
            MergeConfig::from_file(path)
                .with_context(|| format!("failed to load config from {}", path.display()))
        },
    )
}
