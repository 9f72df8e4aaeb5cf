// src/bin/extract_local.rs
//
// Run the extraction over a saved copy of the article, without touching the network.

use anyhow::{Context, Result};
use banscraper::{aggregate::write_csv, config::OUTPUT_FILE, pipeline::extract_records};
use clap::Parser;
use std::{fs, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "extract-local")]
#[command(about = "Extract banned-book tables from a saved Wikipedia page")]
struct Args {
    /// Saved HTML of the article
    html_file: PathBuf,

    /// Output CSV path
    #[arg(short, long, default_value = OUTPUT_FILE)]
    output: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default = if args.verbose { "debug" } else { "info" };
    fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let html = fs::read_to_string(&args.html_file)
        .with_context(|| format!("reading {:?}", args.html_file))?;
    info!(path = %args.html_file.display(), bytes = html.len(), "loaded page");

    let records = extract_records(&html)?;
    write_csv(&records, &args.output)?;

    println!("Wrote {} rows -> {}", records.len(), args.output.display());
    Ok(())
}
