use std::path::PathBuf;

use tabula_core::MutationOutcome;
use tabula_model::{RecordId, ViewKind};

#[derive(Debug)]
pub struct ExportResult {
    pub view: ViewKind,
    pub rows: usize,
    pub files: Vec<PathBuf>,
}

#[derive(Debug)]
pub struct SetFieldResult {
    pub id: RecordId,
    pub field: String,
    pub requested: String,
    /// Value held after the update settled (the old one after a rollback).
    pub current: String,
    pub outcome: MutationOutcome,
}
