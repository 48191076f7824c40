//! Case-insensitive mapping from logical column names to column indices

use std::collections::HashMap;

use crate::error::XlsFormError;
use crate::reader::Sheet;

/// Header lookup resolved once per sheet
#[derive(Debug, Clone, Default)]
pub struct ColumnSchema {
    sheet: String,
    columns: HashMap<String, usize>,
}

impl ColumnSchema {
    /// Resolve the header row. When a header repeats, the leftmost column wins.
    pub fn from_sheet(sheet: &Sheet) -> Self {
        let mut columns = HashMap::new();
        if let Some(header) = sheet.rows.first() {
            for (idx, cell) in header.iter().enumerate() {
                if let Some(text) = cell.as_text() {
                    if !text.is_empty() {
                        columns.entry(text.to_lowercase()).or_insert(idx);
                    }
                }
            }
        }

        Self {
            sheet: sheet.name.clone(),
            columns,
        }
    }

    /// 0-based index of a column, matched case-insensitively
    pub fn get(&self, column: &str) -> Option<usize> {
        self.columns.get(&column.to_lowercase()).copied()
    }

    /// Like `get`, but a missing column is a schema error
    pub fn require(&self, column: &str) -> Result<usize, XlsFormError> {
        self.get(column).ok_or_else(|| XlsFormError::MissingColumn {
            sheet: self.sheet.clone(),
            column: column.to_string(),
        })
    }
}
