use anyhow::Result;
use banscraper::{config::OUTPUT_FILE, fetch, pipeline};
use std::path::Path;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) fetch, extract, write ────────────────────────────────────
    let client = fetch::build_client()?;
    let url = fetch::page_url()?;
    let rows = pipeline::run(&client, &url, Path::new(OUTPUT_FILE)).await?;

    println!("Wrote {} rows -> {}", rows, OUTPUT_FILE);
    Ok(())
}
