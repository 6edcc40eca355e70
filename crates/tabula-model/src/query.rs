//! Query inputs: search term, equality filters and the single sort key.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: String,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }

    /// Header-click semantics: clicking the active ascending column flips it
    /// to descending, anything else sorts ascending by the clicked column.
    #[must_use]
    pub fn toggle(&self, field: &str) -> Self {
        if self.field == field && self.direction == SortDirection::Ascending {
            Self::descending(field)
        } else {
            Self::ascending(field)
        }
    }
}

/// Equality constraints keyed by field name.
///
/// An empty expected value is stored but means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    entries: BTreeMap<String, String>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, field: impl Into<String>, expected: impl Into<String>) -> Self {
        self.set(field, expected);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, expected: impl Into<String>) {
        self.entries.insert(field.into(), expected.into());
    }

    pub fn clear(&mut self, field: &str) {
        self.entries.remove(field);
    }

    /// Constraints that actually restrict the view.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .filter(|(_, expected)| !expected.is_empty())
            .map(|(field, expected)| (field.as_str(), expected.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

/// A single `FIELD=VALUE` filter entry, as typed on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterEntry {
    pub field: String,
    pub expected: String,
}

impl FromStr for FilterEntry {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, expected) = s
            .split_once('=')
            .ok_or_else(|| ModelError::InvalidFilter(s.to_string()))?;
        let field = field.trim();
        if field.is_empty() {
            return Err(ModelError::InvalidFilter(s.to_string()));
        }
        Ok(Self {
            field: field.to_string(),
            expected: expected.to_string(),
        })
    }
}

impl FromIterator<FilterEntry> for Filter {
    fn from_iter<T: IntoIterator<Item = FilterEntry>>(iter: T) -> Self {
        let mut filter = Filter::new();
        for entry in iter {
            filter.set(entry.field, entry.expected);
        }
        filter
    }
}

/// Case-insensitive substring search over a fixed set of string fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpec {
    pub term: String,
    pub fields: Vec<String>,
}

impl SearchSpec {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            term: String::new(),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_follows_header_click_rules() {
        let sort = SortSpec::ascending("name");
        assert_eq!(sort.toggle("name"), SortSpec::descending("name"));
        assert_eq!(
            SortSpec::descending("name").toggle("name"),
            SortSpec::ascending("name")
        );
        assert_eq!(
            SortSpec::descending("name").toggle("phone"),
            SortSpec::ascending("phone")
        );
    }

    #[test]
    fn empty_expected_values_are_inactive() {
        let filter = Filter::new().with("department", "").with("status", "Open");
        let active: Vec<_> = filter.active().collect();
        assert_eq!(active, vec![("status", "Open")]);
        assert!(Filter::new().with("type", "").is_empty());
    }

    #[test]
    fn parses_filter_entries() {
        let entry: FilterEntry = "status=Closed".parse().unwrap();
        assert_eq!(entry.field, "status");
        assert_eq!(entry.expected, "Closed");
        let cleared: FilterEntry = "status=".parse().unwrap();
        assert!(cleared.expected.is_empty());
        assert!("status".parse::<FilterEntry>().is_err());
        assert!("=Open".parse::<FilterEntry>().is_err());
    }
}
