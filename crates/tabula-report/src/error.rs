//! Export error types.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    /// The workbook writer rejected the sheet or its cells.
    #[error("Failed to encode spreadsheet export")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown export format: {0} (expected spreadsheet or document)")]
    UnknownFormat(String),
}

pub type Result<T> = std::result::Result<T, ExportError>;
