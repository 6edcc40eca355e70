//! Declared record shape for one view.
//!
//! A schema is validated once, at ingestion. Anything the schema does not name
//! is still kept, typed by its source shape.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Number,
    Date,
    /// Enumerated status. An empty `allowed` list accepts any text.
    Status { allowed: Vec<String> },
}

impl FieldKind {
    pub fn status<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Status {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Source key holding the record id (`_id` for the admin backend).
    pub id_field: String,
    pub fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new(id_field: impl Into<String>) -> Self {
        Self {
            id_field: id_field.into(),
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldDef {
            name: name.into(),
            kind,
        });
        self
    }

    pub fn kind_of(&self, name: &str) -> Option<&FieldKind> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.kind)
    }

    /// Allowed values of a status field, if `name` is one.
    pub fn status_values(&self, name: &str) -> Option<&[String]> {
        match self.kind_of(name)? {
            FieldKind::Status { allowed } => Some(allowed),
            _ => None,
        }
    }
}
