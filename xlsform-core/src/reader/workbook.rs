//! Sheet data structures

use std::collections::BTreeMap;

/// One data row keyed by column header
pub type Record = BTreeMap<String, String>;

/// A worksheet materialised as a dense grid anchored at A1.
/// Row 0 is the header row.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// Number of rows, header included
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn width(&self) -> usize {
        self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
    }

    /// Get a cell at the given 0-based position
    pub fn get_cell(&self, row: usize, col: usize) -> &CellValue {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&CellValue::Empty)
    }

    /// Trimmed text of a cell, empty for blank cells
    pub fn text(&self, row: usize, col: usize) -> String {
        self.get_cell(row, col).as_text().unwrap_or_default()
    }

    /// Header names; blank header cells become `col_<index>`
    pub fn headers(&self) -> Vec<String> {
        let Some(first) = self.rows.first() else {
            return Vec::new();
        };

        first
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell.as_text() {
                Some(text) if !text.is_empty() => text,
                _ => format!("col_{}", i),
            })
            .collect()
    }

    /// Data rows as header-keyed records. Blank cells contribute no key and
    /// rows without any value are skipped.
    pub fn records(&self) -> Vec<Record> {
        let headers = self.headers();
        let mut records = Vec::new();

        for row in self.rows.iter().skip(1) {
            let mut record = Record::new();
            for (i, cell) in row.iter().enumerate() {
                if i >= headers.len() {
                    break;
                }
                if let Some(text) = cell.as_text() {
                    if !text.is_empty() {
                        record.insert(headers[i].clone(), text);
                    }
                }
            }
            if !record.is_empty() {
                records.push(record);
            }
        }

        records
    }
}

/// Cell value types
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Boolean(bool),
    Error(String),
}

impl CellValue {
    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Render the value the way it reads in a spreadsheet, trimmed
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => Some(s.trim().to_string()),
            CellValue::Number(n) => Some(format_number(*n)),
            CellValue::Boolean(true) => Some("TRUE".to_string()),
            CellValue::Boolean(false) => Some("FALSE".to_string()),
            CellValue::Error(e) => Some(e.clone()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}
