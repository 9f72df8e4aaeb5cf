// src/aggregate.rs

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::process::normalize::CANONICAL_COLUMNS;
use crate::process::{Cell, RecordSet};

/// Stack record sets in order. Columns are the union of all inputs in the
/// order first seen; cells a set lacks are absent.
pub fn concat(sets: Vec<RecordSet>) -> Result<RecordSet> {
    if sets.is_empty() {
        bail!("No tables found under country sections. The page layout may have changed.");
    }

    let mut out = RecordSet::default();
    let mut index: HashMap<String, usize> = HashMap::new();
    for set in &sets {
        for col in &set.columns {
            if !index.contains_key(col) {
                index.insert(col.clone(), out.columns.len());
                out.columns.push(col.clone());
            }
        }
    }

    let width = out.columns.len();
    for set in sets {
        let slots: Vec<usize> = set.columns.iter().map(|c| index[c]).collect();
        for row in set.rows {
            let mut merged: Vec<Cell> = vec![None; width];
            for (slot, cell) in slots.iter().zip(row) {
                merged[*slot] = cell;
            }
            out.rows.push(merged);
        }
    }

    debug!(columns = width, rows = out.len(), "concatenated tables");
    Ok(out)
}

/// Canonical columns first in fixed order, every other column after them
/// in its current order. Canonical columns missing from `set` are added empty.
pub fn order_columns(set: RecordSet) -> RecordSet {
    let mut order: Vec<String> = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
    order.extend(
        set.columns
            .iter()
            .filter(|c| !CANONICAL_COLUMNS.contains(&c.as_str()))
            .cloned(),
    );

    let source: Vec<Option<usize>> = order.iter().map(|c| set.column_index(c)).collect();
    let rows = set
        .rows
        .into_iter()
        .map(|mut row| {
            source
                .iter()
                .map(|src| src.and_then(|i| row[i].take()))
                .collect()
        })
        .collect();

    RecordSet {
        columns: order,
        rows,
    }
}

/// Serialize as CSV: header row, comma-delimited, `\n` terminated, absent cells empty.
pub fn write_csv_to<W: Write>(set: &RecordSet, writer: W) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    wtr.write_record(&set.columns)
        .context("writing CSV header")?;
    for (i, row) in set.rows.iter().enumerate() {
        wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))
            .with_context(|| format!("writing CSV row {}", i))?;
    }
    wtr.flush().context("flushing CSV writer")?;
    Ok(())
}

/// Write `set` to `path` through a temp file in the same directory, so the
/// destination is either the complete CSV or untouched.
pub fn write_csv(set: &RecordSet, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temp file in {:?}", dir))?;
    write_csv_to(set, &mut tmp).with_context(|| format!("writing {:?}", tmp.path()))?;
    tmp.persist(path)
        .with_context(|| format!("moving CSV into place at {:?}", path))?;

    info!(path = %path.display(), rows = set.len(), "wrote CSV");
    Ok(())
}
