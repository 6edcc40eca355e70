//! Data model for the tabula record browser.
//!
//! Records, typed field values, the per-view schema, query inputs (search,
//! filters, sort) and the built-in view presets.

pub mod error;
pub mod ids;
pub mod preset;
pub mod query;
pub mod record;
pub mod schema;
pub mod value;

pub use error::{ModelError, Result};
pub use ids::RecordId;
pub use preset::{Accessor, CellFormat, Column, ExportNames, ViewKind, ViewPreset};
pub use query::{Filter, FilterEntry, SearchSpec, SortDirection, SortSpec};
pub use record::Record;
pub use schema::{FieldDef, FieldKind, Schema};
pub use value::{FieldValue, SortKey};
