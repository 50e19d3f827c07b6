//! In-memory representation of one input table.
//!
//! Form specifications arrive as spreadsheet exports with inconsistent
//! header hygiene (byte-order marks, stray whitespace), so headers are
//! normalized on load. Cell text is kept verbatim apart from trimming.

use std::io;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::Result;

/// A fully loaded input table: normalized headers plus row cells.
#[derive(Debug, Clone)]
pub struct SheetTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows in input order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().enumerate().map(|(index, cells)| Row {
            headers: &self.headers,
            cells,
            // +2 to match the spreadsheet view: 1-based plus header row.
            number: index + 2,
        })
    }
}

/// One record of the table, addressed by column header.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    headers: &'a [String],
    cells: &'a [String],
    number: usize,
}

impl<'a> Row<'a> {
    /// Spreadsheet row number (1-based, counting the header row).
    pub fn number(&self) -> usize {
        self.number
    }

    /// The trimmed cell under `header`, or `None` when absent or empty.
    pub fn value(&self, header: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|h| h == header)?;
        let cell = self.cells.get(index)?.trim();
        if cell.is_empty() { None } else { Some(cell) }
    }

    pub fn has_value(&self, header: &str) -> bool {
        self.value(header).is_some()
    }

    /// True when every cell is empty (spreadsheet padding rows).
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|cell| cell.trim().is_empty())
    }
}

/// Normalize a raw header: strip BOM, trim, collapse inner whitespace
/// runs to single spaces.
fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str) -> String {
    raw.trim_matches('\u{feff}').to_string()
}

/// Read a CSV file into a [`SheetTable`].
pub fn read_table(path: &Path) -> Result<SheetTable> {
    let file = std::fs::File::open(path)?;
    read_table_from_reader(file)
}

/// Read CSV data from any reader into a [`SheetTable`].
pub fn read_table_from_reader(reader: impl io::Read) -> Result<SheetTable> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader
        .headers()?
        .iter()
        .map(normalize_header)
        .collect::<Vec<_>>();
    let mut rows = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        rows.push(record.iter().map(normalize_cell).collect());
    }
    Ok(SheetTable::new(headers, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_bom_and_whitespace() {
        assert_eq!(normalize_header("\u{feff}Question  Type "), "Question Type");
        assert_eq!(normalize_header("  Variable Name"), "Variable Name");
    }

    #[test]
    fn reads_rows_with_spreadsheet_numbering() {
        let data = "Variable Name,Question Type\nage,long\nsex,list\n";
        let table = read_table_from_reader(data.as_bytes()).expect("read table");
        assert_eq!(table.row_count(), 2);
        let numbers: Vec<usize> = table.rows().map(|row| row.number()).collect();
        assert_eq!(numbers, vec![2, 3]);
    }

    #[test]
    fn empty_cells_read_as_none() {
        let data = "Variable Name,Question Type\nage,\n";
        let table = read_table_from_reader(data.as_bytes()).expect("read table");
        let row = table.rows().next().expect("row");
        assert_eq!(row.value("Variable Name"), Some("age"));
        assert_eq!(row.value("Question Type"), None);
        assert!(!row.has_value("Missing Column"));
    }

    #[test]
    fn blank_rows_are_detected() {
        let data = "A,B\n,\nx,y\n";
        let table = read_table_from_reader(data.as_bytes()).expect("read table");
        let flags: Vec<bool> = table.rows().map(|row| row.is_empty()).collect();
        assert_eq!(flags, vec![true, false]);
    }

    #[test]
    fn short_rows_are_tolerated() {
        let data = "A,B,C\nonly-a\n";
        let table = read_table_from_reader(data.as_bytes()).expect("read table");
        let row = table.rows().next().expect("row");
        assert_eq!(row.value("A"), Some("only-a"));
        assert_eq!(row.value("C"), None);
    }
}
