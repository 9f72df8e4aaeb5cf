// src/fetch.rs

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

use crate::config::{PAGE_URL, USER_AGENT};

/// Client used for the single page request.
pub fn build_client() -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .gzip(true)
        .build()
        .context("building HTTP client")
}

/// The article URL, parsed.
pub fn page_url() -> Result<Url> {
    Url::parse(PAGE_URL).with_context(|| format!("parsing page URL {}", PAGE_URL))
}

/// GET `url` once and return the body. Non-2xx responses are errors.
pub async fn fetch_page(client: &Client, url: &Url) -> Result<String> {
    debug!("Fetching text from {}", url);
    let body = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {} failed", url))?
        .error_for_status()
        .with_context(|| format!("Non-success status {}", url))?
        .text()
        .await
        .with_context(|| format!("Reading text from {}", url))?;
    info!(%url, bytes = body.len(), "fetched page");
    Ok(body)
}
