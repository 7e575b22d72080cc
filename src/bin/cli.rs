//! SstLookup CLI
//!
//! Looks up one key in a table file and reports the block handles visited.
//!
//! Exit status: 0 when the key is found, 1 when it is absent, 2 when the
//! file cannot be read or is malformed.

use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use sstlookup::sstable::read_table_file;
use sstlookup::{BlockHandle, Error, LookupTrace, ReadOptions, SeekMode, TableReader};
use std::path::PathBuf;
use std::process::ExitCode;

/// SstLookup CLI
#[derive(Parser, Debug)]
#[command(name = "sstlookup")]
#[command(about = "Look up a key in a block-based table file (format version 5)")]
struct Args {
    /// Path to the table file
    file: PathBuf,

    /// The key to look up
    key: String,

    /// Binary search restart points instead of scanning whole blocks
    #[arg(long)]
    binary_search: bool,

    /// Print the lookup trace as JSON
    #[arg(long)]
    json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    key: &'a str,
    metaindex_handle: BlockHandle,
    index_handle: BlockHandle,
    data_handle: Option<BlockHandle>,
    found: bool,
    value: Option<String>,
}

impl<'a> Report<'a> {
    fn new(key: &'a str, trace: &LookupTrace<'_>) -> Self {
        Self {
            key,
            metaindex_handle: trace.metaindex_handle,
            index_handle: trace.index_handle,
            data_handle: trace.data_handle,
            found: trace.value.is_some(),
            value: trace.value.map(|v| String::from_utf8_lossy(v).into_owned()),
        }
    }
}

fn run(args: &Args) -> anyhow::Result<bool> {
    if args.key.is_empty() {
        return Err(Error::invalid_argument("key must not be empty").into());
    }

    let file = read_table_file(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let seek_mode =
        if args.binary_search { SeekMode::RestartBinarySearch } else { SeekMode::Linear };
    let reader = TableReader::with_options(&file, ReadOptions::new().seek_mode(seek_mode))
        .with_context(|| format!("invalid table file {}", args.file.display()))?;

    let trace = reader.lookup(args.key.as_bytes())?;
    let report = Report::new(&args.key, &trace);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report.found);
    }

    println!("Metaindex: {}", report.metaindex_handle);
    println!("Index: {}", report.index_handle);
    if let Some(handle) = report.data_handle {
        println!("Data block: {}", handle);
    }

    match &report.value {
        Some(value) => println!("Found key '{}': {}", args.key, value),
        None => println!("Key '{}' not found.", args.key),
    }
    Ok(report.found)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}
