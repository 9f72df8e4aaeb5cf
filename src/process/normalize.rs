// src/process/normalize.rs
use std::collections::{HashMap, HashSet};
use tracing::debug;

use super::utils::clean_str;
use super::{RawTable, RecordSet};
use crate::sections::SectionContext;

pub const COUNTRY: &str = "Country";
pub const SUBDIVISION: &str = "Subdivision";
pub const TITLE: &str = "Title";

/// Columns every table is completed with, in the order they are appended.
pub static EXPECTED_COLUMNS: &[&str] = &[
    "Title",
    "Author(s)",
    "Year published",
    "Year banned",
    "Year unbanned",
    "Type",
    "Notes",
];

/// Leading output columns, in output order.
pub static CANONICAL_COLUMNS: &[&str] = &[
    "Country",
    "Subdivision",
    "Title",
    "Author(s)",
    "Year published",
    "Year banned",
    "Year unbanned",
    "Type",
    "Notes",
];

/// Map a header variant to its canonical name; unknown headers pass through trimmed.
pub fn canonical_name(header: &str) -> &str {
    match header.trim() {
        "Authors" => "Author(s)",
        "Year of publication" | "Publication year" => "Year published",
        "Reason" | "Reasons" => "Notes",
        "Country" => "Country of origin",
        other => other,
    }
}

/// One name per column. Without header rows columns are numbered; a stacked
/// header uses its first non-empty part, else the last part.
pub fn column_names(raw: &RawTable) -> Vec<String> {
    let has_header = raw.has_header();
    let names = raw
        .headers
        .iter()
        .enumerate()
        .map(|(i, parts)| {
            if !has_header {
                return i.to_string();
            }
            let label = parts
                .iter()
                .find(|p| !p.trim().is_empty())
                .or(parts.last())
                .map(|p| p.trim())
                .unwrap_or("");
            if label.is_empty() {
                format!("Unnamed: {}", i)
            } else {
                label.to_string()
            }
        })
        .collect();
    mangle_duplicates(names)
}

/// Keep the first of each name; later repeats become `name.1`, `name.2`, ...
pub fn mangle_duplicates(names: Vec<String>) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::with_capacity(names.len());
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let n = counts.entry(name.clone()).or_insert(0);
        let mut candidate = name.clone();
        while used.contains(&candidate) {
            *n += 1;
            candidate = format!("{}.{}", name, n);
        }
        used.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

/// Turn one parsed table into clean rows tagged with their section.
/// Returns `None` when no row has a title.
pub fn normalize_table(raw: RawTable, ctx: &SectionContext) -> Option<RecordSet> {
    let renamed = column_names(&raw)
        .iter()
        .map(|n| canonical_name(n).to_string())
        .collect();

    let mut rs = RecordSet {
        columns: mangle_duplicates(renamed),
        rows: raw.rows,
    };

    for row in &mut rs.rows {
        for cell in row.iter_mut() {
            *cell = cell.as_deref().and_then(clean_str);
        }
    }
    let before = rs.len();
    rs.rows.retain(|r| r.iter().any(Option::is_some));

    for col in EXPECTED_COLUMNS {
        if !rs.has_column(col) {
            rs.push_column(col, None);
        }
    }

    rs.insert_column(0, SUBDIVISION, ctx.subdivision.clone());
    rs.insert_column(0, COUNTRY, Some(ctx.country.clone()));
    // a table column that happens to be called Country/Subdivision yields to ours
    rs.columns = mangle_duplicates(std::mem::take(&mut rs.columns));

    let title = rs.column_index(TITLE)?;
    rs.rows
        .retain(|r| r[title].as_deref().map_or(false, |t| !t.is_empty()));

    debug!(
        country = %ctx.country,
        subdivision = ?ctx.subdivision,
        rows_in = before,
        rows_out = rs.len(),
        "normalized table"
    );

    if rs.is_empty() {
        None
    } else {
        Some(rs)
    }
}
