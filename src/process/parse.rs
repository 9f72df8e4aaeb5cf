// src/process/parse.rs
use anyhow::{bail, Result};
use scraper::node::Element;
use scraper::ElementRef;
use tracing::trace;

use super::utils::{parse_span, MAX_COLSPAN, MAX_ROWSPAN};
use super::{Cell, RawTable};
use crate::html::{enclosing, visible_text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Head,
    Body,
    Foot,
}

#[derive(Debug, Clone)]
struct SourceCell {
    text: Cell,
    header: bool,
    colspan: usize,
    rowspan: usize,
}

fn skip_in_cell(el: &Element) -> bool {
    matches!(el.name(), "style" | "script")
}

/// Parse one `<table>` element into a span-expanded grid.
///
/// Header rows are the `<thead>` rows or, failing that, the leading rows made
/// only of `<th>` cells. Spans are expanded separately within the header,
/// body and footer sections; footer rows follow the body rows.
pub fn parse_table(table: ElementRef<'_>) -> Result<RawTable> {
    let mut head: Vec<Vec<SourceCell>> = Vec::new();
    let mut body: Vec<Vec<SourceCell>> = Vec::new();
    let mut foot: Vec<Vec<SourceCell>> = Vec::new();

    for row in own_rows(table) {
        let cells = row_cells(row);
        match row_section(row) {
            Section::Head => head.push(cells),
            Section::Body => body.push(cells),
            Section::Foot => foot.push(cells),
        }
    }

    if head.is_empty() {
        while body
            .first()
            .map_or(false, |r| !r.is_empty() && r.iter().all(|c| c.header))
        {
            head.push(body.remove(0));
        }
    }

    let header_grid = expand_spans(&head);
    let mut rows = expand_spans(&body);
    rows.extend(expand_spans(&foot));

    if rows.is_empty() {
        bail!("table has no data rows");
    }

    let width = header_grid
        .iter()
        .chain(rows.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);
    if width == 0 {
        bail!("table has no columns");
    }

    let headers = (0..width)
        .map(|col| {
            header_grid
                .iter()
                .map(|r| r.get(col).cloned().flatten().unwrap_or_default())
                .collect::<Vec<_>>()
        })
        .collect();

    for row in &mut rows {
        row.resize(width, None);
    }

    trace!(
        header_rows = header_grid.len(),
        rows = rows.len(),
        width,
        "parsed table"
    );
    Ok(RawTable { headers, rows })
}

/// `<tr>` elements belonging to `table` itself, skipping rows of nested tables.
fn own_rows<'a>(table: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    table
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "tr")
        .filter(move |tr| enclosing(*tr, "table").map(|t| t.id()) == Some(table.id()))
}

fn row_section(row: ElementRef<'_>) -> Section {
    match row
        .parent()
        .and_then(ElementRef::wrap)
        .map(|p| p.value().name())
    {
        Some("thead") => Section::Head,
        Some("tfoot") => Section::Foot,
        _ => Section::Body,
    }
}

fn row_cells(row: ElementRef<'_>) -> Vec<SourceCell> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|c| matches!(c.value().name(), "td" | "th"))
        .map(|c| {
            let text = visible_text(c, skip_in_cell);
            SourceCell {
                text: if text.is_empty() { None } else { Some(text) },
                header: c.value().name() == "th",
                colspan: parse_span(c.value().attr("colspan"), MAX_COLSPAN),
                rowspan: parse_span(c.value().attr("rowspan"), MAX_ROWSPAN),
            }
        })
        .collect()
}

/// Copy values still owed by earlier rowspans into `row`, starting at `col`.
fn push_rowspan_cells(pending: &mut [Option<(usize, Cell)>], row: &mut Vec<Cell>, col: &mut usize) {
    while *col < pending.len() {
        let Some((remaining, val)) = pending[*col].take() else {
            break;
        };
        row.push(val.clone());
        if remaining > 1 {
            pending[*col] = Some((remaining - 1, val));
        }
        *col += 1;
    }
}

/// After a row's own cells run out, place every rowspan still owed at or past
/// `col` in its own column, padding gaps with absent cells.
fn place_trailing_rowspans(pending: &mut [Option<(usize, Cell)>], row: &mut Vec<Cell>, col: usize) {
    for idx in col..pending.len() {
        let Some((remaining, val)) = pending[idx].take() else {
            continue;
        };
        row.resize(idx, None);
        row.push(val.clone());
        if remaining > 1 {
            pending[idx] = Some((remaining - 1, val));
        }
    }
}

fn expand_spans(rows: &[Vec<SourceCell>]) -> Vec<Vec<Cell>> {
    let mut pending: Vec<Option<(usize, Cell)>> = Vec::new();
    let mut out = Vec::with_capacity(rows.len());

    for cells in rows {
        let mut row: Vec<Cell> = Vec::new();
        let mut col = 0;

        for cell in cells {
            push_rowspan_cells(&mut pending, &mut row, &mut col);

            let need = col + cell.colspan;
            if pending.len() < need {
                pending.resize(need, None);
            }
            for i in 0..cell.colspan {
                row.push(cell.text.clone());
                // a cell laid over a spanned column ends that span
                pending[col + i] = if cell.rowspan > 1 {
                    Some((cell.rowspan - 1, cell.text.clone()))
                } else {
                    None
                };
            }
            col = need;
        }
        place_trailing_rowspans(&mut pending, &mut row, col);

        out.push(row);
    }

    out
}
