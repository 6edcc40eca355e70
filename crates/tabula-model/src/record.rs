#![deny(unsafe_code)]

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{FieldValue, RecordId};

static MISSING: FieldValue = FieldValue::Missing;

/// One addressable business entity.
///
/// Records are replaced, never edited: [`Record::with_field`] returns a new
/// value and leaves the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    id: RecordId,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(id: RecordId) -> Self {
        Self {
            id,
            fields: BTreeMap::new(),
        }
    }

    pub fn id(&self) -> &RecordId {
        &self.id
    }

    /// Value of `field`, or [`FieldValue::Missing`] when absent.
    pub fn get(&self, field: &str) -> &FieldValue {
        self.fields.get(field).unwrap_or(&MISSING)
    }

    /// Stored value of `field`, `None` when the record has no such entry.
    pub fn try_get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Builder-style insert used while assembling a record.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// A copy of this record with one field replaced.
    #[must_use]
    pub fn with_field(&self, name: &str, value: FieldValue) -> Self {
        let mut next = self.clone();
        next.fields.insert(name.to_string(), value);
        next
    }

    /// A copy of this record without `name`.
    #[must_use]
    pub fn without_field(&self, name: &str) -> Self {
        let mut next = self.clone();
        next.fields.remove(name);
        next
    }
}
