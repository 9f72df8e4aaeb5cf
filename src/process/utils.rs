use once_cell::sync::Lazy;
use regex::Regex;
use std::num::IntErrorKind;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace regex"));

/// Cell texts treated as "no value" when they are the whole cell.
pub static MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Collapse whitespace runs to a single space and trim the ends.
pub fn collapse_ws(raw: &str) -> String {
    WHITESPACE.replace_all(raw, " ").trim().to_string()
}

/// Trim a value and map missing markers to `None`.
pub fn clean_str(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if MISSING_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Largest `colspan` honoured.
pub const MAX_COLSPAN: usize = 1000;
/// Largest `rowspan` honoured.
pub const MAX_ROWSPAN: usize = 65534;

/// Parse a `colspan`/`rowspan` attribute, falling back to 1 and capping at `max`.
pub fn parse_span(attr: Option<&str>, max: usize) -> usize {
    attr.and_then(|v| match v.trim().parse::<u64>() {
        Ok(n) => Some(n),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Some(u64::MAX),
        Err(_) => None,
    })
    .filter(|&n| n > 0)
    .map_or(1, |n| usize::try_from(n).unwrap_or(usize::MAX).min(max))
}
