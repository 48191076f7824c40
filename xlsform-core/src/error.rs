//! Error kinds reported by the inserter and the analyzer

use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single tool invocation. Every variant is terminal.
#[derive(Debug, Error)]
pub enum XlsFormError {
    /// The path does not exist (checked before any parse attempt)
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The spreadsheet library could not parse the file
    #[error("Cannot open file: {0}")]
    UnopenableFile(String),

    #[error("No '{0}' sheet found in workbook")]
    MissingSheet(String),

    #[error("Could not find '{column}' column in {sheet} sheet")]
    MissingColumn { sheet: String, column: String },

    #[error("Field '{0}' already exists in the form")]
    DuplicateField(String),

    /// Write or permission failure while persisting the workbook
    #[error("Cannot save file: {0}")]
    UnsavableFile(String),
}

impl XlsFormError {
    /// Stable name of the error kind, used in machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            XlsFormError::FileNotFound(_) => "FileNotFound",
            XlsFormError::UnopenableFile(_) => "UnopenableFile",
            XlsFormError::MissingSheet(_) => "MissingSheet",
            XlsFormError::MissingColumn { .. } => "MissingColumn",
            XlsFormError::DuplicateField(_) => "DuplicateField",
            XlsFormError::UnsavableFile(_) => "UnsavableFile",
        }
    }
}
