// src/process/mod.rs

pub mod normalize;
pub mod parse;
pub mod utils;

pub use normalize::normalize_table;
pub use parse::parse_table;

/// One cell; `None` is the absent marker.
pub type Cell = Option<String>;

/// The span-expanded grid of one HTML table, before any naming decisions.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Per column, one label part per header row (empty when the header cell was blank).
    /// Empty inner vectors when the table had no header rows.
    pub headers: Vec<Vec<String>>,
    /// Body rows, padded to `headers.len()`.
    pub rows: Vec<Vec<Cell>>,
}

impl RawTable {
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    pub fn has_header(&self) -> bool {
        self.headers.iter().any(|parts| !parts.is_empty())
    }
}

/// Ordered columns plus rows of optional string cells.
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl RecordSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Insert a column at `idx`, setting every row to `fill`.
    pub fn insert_column(&mut self, idx: usize, name: &str, fill: Cell) {
        self.columns.insert(idx, name.to_string());
        for row in &mut self.rows {
            row.insert(idx, fill.clone());
        }
    }

    /// Append a column, setting every row to `fill`.
    pub fn push_column(&mut self, name: &str, fill: Cell) {
        self.insert_column(self.columns.len(), name, fill);
    }

    /// Value of `name` in row `row`, if both exist and the cell is present.
    pub fn value(&self, row: usize, name: &str) -> Option<&str> {
        let idx = self.column_index(name)?;
        self.rows.get(row)?.get(idx)?.as_deref()
    }

    /// All values of one column, absent cells as "".
    pub fn column_values(&self, name: &str) -> Vec<&str> {
        match self.column_index(name) {
            Some(idx) => self
                .rows
                .iter()
                .map(|r| r[idx].as_deref().unwrap_or(""))
                .collect(),
            None => Vec::new(),
        }
    }
}
