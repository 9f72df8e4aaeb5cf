// src/pipeline.rs

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use std::path::Path;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::aggregate::{concat, order_columns, write_csv};
use crate::config::{CONTENT_SELECTOR, TABLE_SELECTOR};
use crate::fetch::fetch_page;
use crate::process::{normalize_table, parse_table, RecordSet};
use crate::sections::HeadingIndex;

static CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse(CONTENT_SELECTOR).expect("content selector should parse"));
static TABLES: Lazy<Selector> =
    Lazy::new(|| Selector::parse(TABLE_SELECTOR).expect("table selector should parse"));

/// Every wikitable row on the page, tagged with its country section,
/// normalized and in canonical column order.
#[instrument(level = "info", skip(html), fields(bytes = html.len()))]
pub fn extract_records(html: &str) -> Result<RecordSet> {
    let doc = Html::parse_document(html);
    let content = doc
        .select(&CONTENT)
        .next()
        .ok_or_else(|| anyhow!("Could not locate page body ({})", CONTENT_SELECTOR))?;

    let index = HeadingIndex::build(&doc);
    let mut frames = Vec::new();

    for (i, table) in content.select(&TABLES).enumerate() {
        let Some(ctx) = index.resolve(table) else {
            debug!(table = i, "skipping table outside country sections");
            continue;
        };

        let raw = match parse_table(table) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(table = i, country = %ctx.country, error = %e, "skipping unreadable table");
                continue;
            }
        };

        match normalize_table(raw, &ctx) {
            Some(rs) => {
                debug!(table = i, country = %ctx.country, rows = rs.len(), "kept table");
                frames.push(rs);
            }
            None => debug!(table = i, country = %ctx.country, "table has no titled rows"),
        }
    }

    if frames.is_empty() {
        warn!("no wikitables survived extraction");
    } else {
        info!(tables = frames.len(), "extracted tables");
    }
    Ok(order_columns(concat(frames)?))
}

/// Fetch the page, extract its rows and write them to `out`. Returns the row count.
#[instrument(level = "info", skip(client, out), fields(out = %out.display()))]
pub async fn run(client: &Client, url: &Url, out: &Path) -> Result<usize> {
    let html = fetch_page(client, url).await?;
    let records = extract_records(&html)?;
    write_csv(&records, out)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::write_csv_to;
    use crate::fetch::build_client;
    use tempfile::tempdir;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page(body: &str) -> String {
        format!(
            r#"<!DOCTYPE html><html><head><title>List</title></head><body>
            <h1>List of books banned by governments</h1>
            <div id="mw-content-text"><div class="mw-parser-output">{}</div></div>
            </body></html>"#,
            body
        )
    }

    const ARTICLE: &str = r#"
        <p>Intro text.</p>
        <table class="wikitable"><tr><th>Title</th></tr><tr><td>Before any country</td></tr></table>

        <div class="mw-heading mw-heading2"><h2 id="Canada">Canada</h2><span class="mw-editsection">[edit]</span></div>
        <table class="wikitable sortable">
          <tr><th>Title</th><th>Authors</th><th>Year banned</th><th>Reason</th></tr>
          <tr><td>Lady Chatterley's Lover</td><td>D. H. Lawrence</td><td>1929</td><td>Obscenity</td></tr>
          <tr><td></td><td>Nobody</td><td>1930</td><td>No title</td></tr>
        </table>
        <div class="mw-heading mw-heading3"><h3 id="Quebec">Quebec</h3></div>
        <table class="wikitable">
          <tr><th>Title</th><th>Author(s)</th><th>Publisher</th></tr>
          <tr><td>Les Insolences du Frère Untel</td><td>Jean-Paul Desbiens</td><td>Éditions de l'Homme</td></tr>
        </table>
        <table class="infobox"><tr><th>Title</th></tr><tr><td>Not a wikitable</td></tr></table>

        <div class="mw-heading mw-heading2"><h2 id="France">France</h2></div>
        <table class="wikitable">
          <tr><th>Title</th><th>Author(s)</th><th>Year published</th></tr>
          <tr><td>Madame Bovary</td><td>Gustave Flaubert</td><td>1856</td></tr>
        </table>

        <div class="mw-heading mw-heading2"><h2 id="References">References</h2></div>
        <table class="wikitable"><tr><th>Title</th></tr><tr><td>Citation table</td></tr></table>
    "#;

    #[test]
    fn test_extract_records_end_to_end() -> Result<()> {
        let rs = extract_records(&page(ARTICLE))?;

        assert_eq!(rs.len(), 3);
        assert_eq!(
            &rs.columns[..9],
            &[
                "Country",
                "Subdivision",
                "Title",
                "Author(s)",
                "Year published",
                "Year banned",
                "Year unbanned",
                "Type",
                "Notes",
            ]
        );
        assert_eq!(&rs.columns[9..], &["Publisher"]);

        assert_eq!(rs.column_values("Country"), vec!["Canada", "Canada", "France"]);
        assert_eq!(rs.column_values("Subdivision"), vec!["", "Quebec", ""]);
        assert_eq!(
            rs.column_values("Author(s)"),
            vec!["D. H. Lawrence", "Jean-Paul Desbiens", "Gustave Flaubert"]
        );
        assert_eq!(rs.column_values("Notes"), vec!["Obscenity", "", ""]);
        assert_eq!(rs.value(1, "Publisher"), Some("Éditions de l'Homme"));

        let titles = rs.column_values("Title");
        assert!(titles.iter().all(|t| !t.is_empty()));
        assert!(!titles.contains(&"Citation table"));
        assert!(!titles.contains(&"Before any country"));
        assert!(!titles.contains(&"Not a wikitable"));
        Ok(())
    }

    #[test]
    fn test_output_is_deterministic() -> Result<()> {
        let html = page(ARTICLE);
        let mut first = Vec::new();
        let mut second = Vec::new();
        write_csv_to(&extract_records(&html)?, &mut first)?;
        write_csv_to(&extract_records(&html)?, &mut second)?;
        assert_eq!(first, second);
        assert!(String::from_utf8(first)?.starts_with(
            "Country,Subdivision,Title,Author(s),Year published,Year banned,Year unbanned,Type,Notes,Publisher\n"
        ));
        Ok(())
    }

    #[test]
    fn test_missing_content_container_is_fatal() {
        let err = extract_records("<html><body><h2>Canada</h2></body></html>").unwrap_err();
        assert!(err.to_string().contains("Could not locate page body"));
    }

    #[test]
    fn test_no_wikitables_is_fatal() {
        let err = extract_records(&page("<h2>Canada</h2><p>No tables here.</p>")).unwrap_err();
        assert!(err.to_string().contains("No tables found under country sections"));
    }

    #[tokio::test]
    async fn test_run_writes_nothing_when_layout_changed() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page("<h2>Canada</h2>")))
            .mount(&server)
            .await;

        let dir = tempdir()?;
        let out = dir.path().join("out.csv");
        let url = Url::parse(&server.uri())?;
        assert!(run(&build_client()?, &url, &out).await.is_err());
        assert!(!out.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_run_writes_csv() -> Result<()> {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(page(ARTICLE)))
            .mount(&server)
            .await;

        let dir = tempdir()?;
        let out = dir.path().join("out.csv");
        let url = Url::parse(&server.uri())?;
        let rows = run(&build_client()?, &url, &out).await?;

        assert_eq!(rows, 3);
        let text = std::fs::read_to_string(&out)?;
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains("Canada,Quebec,Les Insolences du Frère Untel,Jean-Paul Desbiens"));
        Ok(())
    }
}
