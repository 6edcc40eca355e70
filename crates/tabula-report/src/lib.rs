//! Export of a derived view to files.
//!
//! Two encodings are supported:
//!
//! - **Spreadsheet**: Excel workbook with one sheet (`<base>.xlsx`)
//! - **Document**: paged PDF table, header repeated on every page (`<base>.pdf`)
//!
//! Both are produced from one [`render_rows`] pass, so a cell reads the same
//! in every format. Exports always cover the whole view, not the current page.

mod document;
mod error;
mod render;
mod spreadsheet;

use std::ffi::OsString;
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tabula_core::View;
use tabula_model::{Column, ExportNames, Record, ViewPreset};
use tracing::info;

pub use document::{DEFAULT_ROWS_PER_PAGE, MAX_ROWS_PER_PAGE};
pub use error::{ExportError, Result};
pub use render::{RenderedTable, render_cell, render_rows};
pub use spreadsheet::sheet_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Spreadsheet,
    Document,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 2] = [ExportFormat::Spreadsheet, ExportFormat::Document];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "spreadsheet",
            ExportFormat::Document => "document",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Spreadsheet => "xlsx",
            ExportFormat::Document => "pdf",
        }
    }

    /// Fixed output file name for a view's export base name.
    pub fn file_name(&self, base_name: &str) -> String {
        format!("{base_name}.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spreadsheet" | "xlsx" | "excel" => Ok(ExportFormat::Spreadsheet),
            "document" | "pdf" => Ok(ExportFormat::Document),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Rows per page of the PDF document, capped to [`MAX_ROWS_PER_PAGE`].
    pub rows_per_page: NonZeroUsize,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
        }
    }
}

/// An encoded export ready to be written or handed to a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    /// Data rows written, excluding the header.
    pub rows: usize,
    pub bytes: Vec<u8>,
}

/// Encode `records` (in order) with the given columns.
pub fn serialize(
    records: &[&Record],
    columns: &[Column],
    names: &ExportNames,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    let table = render_rows(records, columns);
    let bytes = match format {
        ExportFormat::Spreadsheet => {
            spreadsheet::write_workbook(&table, &names.sheet_name, &names.title)?
        }
        ExportFormat::Document => {
            document::write_document(&table, &names.title, options.rows_per_page)
        }
    };
    let artifact = ExportArtifact {
        file_name: format.file_name(&names.base_name),
        format,
        rows: table.len(),
        bytes,
    };
    info!(
        format = %format,
        file = %artifact.file_name,
        rows = artifact.rows,
        "Encoded export"
    );
    Ok(artifact)
}

/// Export a whole view using its preset's columns and names.
pub fn export_view(
    view: &View<'_>,
    preset: &ViewPreset,
    format: ExportFormat,
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    serialize(
        view.records(),
        &preset.columns,
        &preset.export,
        format,
        options,
    )
}

/// Write `artifact` into `dir` under its fixed file name.
pub fn write_artifact(dir: &Path, artifact: &ExportArtifact) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        operation: "create directory",
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(&artifact.file_name);
    write_atomic(&path, &artifact.bytes)?;
    info!(path = %path.display(), bytes = artifact.bytes.len(), "Wrote export");
    Ok(path)
}

/// Replace the contents of `path` with `bytes`.
///
/// The data goes to a temporary sibling first and is renamed into place, so
/// an interrupted write never leaves a truncated file behind.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut temp_name = path.file_name().map(OsString::from).unwrap_or_default();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    let mut file = File::create(&temp_path).map_err(|source| ExportError::Io {
        operation: "create",
        path: temp_path.clone(),
        source,
    })?;
    file.write_all(bytes)
        .and_then(|()| file.sync_all())
        .map_err(|source| ExportError::Io {
            operation: "write",
            path: temp_path.clone(),
            source,
        })?;
    fs::rename(&temp_path, path).map_err(|source| {
        let _ = fs::remove_file(&temp_path);
        ExportError::Io {
            operation: "rename",
            path: path.to_path_buf(),
            source,
        }
    })
}
