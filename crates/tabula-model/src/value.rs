//! Field values and their ordering.
//!
//! Every value a record can hold is one of a small closed set of shapes. Values
//! that failed validation at ingestion are carried as [`FieldValue::Malformed`]
//! so they can still be displayed, but they sort and filter like a missing
//! value.

use std::borrow::Cow;
use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    /// A value drawn from an enumerated status list.
    Status(String),
    /// Source value that did not parse for the field's declared kind.
    Malformed(String),
    Missing,
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn status(value: impl Into<String>) -> Self {
        Self::Status(value.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// The string content of string-valued fields, used for search.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) | Self::Status(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Date(value) => Some(*value),
            _ => None,
        }
    }

    /// Canonical text used for equality filters and as the default cell text.
    pub fn display_text(&self) -> Cow<'_, str> {
        match self {
            Self::Text(value) | Self::Status(value) | Self::Malformed(value) => {
                Cow::Borrowed(value)
            }
            Self::Number(value) => Cow::Owned(format_number(*value)),
            Self::Date(value) => Cow::Owned(value.to_rfc3339_opts(SecondsFormat::Secs, true)),
            Self::Missing => Cow::Borrowed(""),
        }
    }

    /// Equality against a filter's expected value.
    ///
    /// Dates match on calendar day when the expected value is a plain
    /// `YYYY-MM-DD` date.
    pub fn matches(&self, expected: &str) -> bool {
        match self {
            Self::Missing | Self::Malformed(_) => false,
            Self::Date(value) => match NaiveDate::parse_from_str(expected.trim(), "%Y-%m-%d") {
                Ok(day) => value.date_naive() == day,
                Err(_) => self.display_text() == expected,
            },
            _ => self.display_text() == expected,
        }
    }

    pub fn sort_key(&self) -> SortKey<'_> {
        match self {
            Self::Text(value) | Self::Status(value) => SortKey::Text(value),
            Self::Number(value) if !value.is_nan() => SortKey::Number(*value),
            Self::Date(value) => SortKey::Date(*value),
            Self::Number(_) | Self::Malformed(_) | Self::Missing => SortKey::Minimal,
        }
    }
}

/// Totally ordered projection of a [`FieldValue`].
///
/// `Minimal` sorts before everything. Across shapes (which a schema normally
/// prevents) numbers sort before dates, and dates before text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Minimal,
    Number(f64),
    Date(DateTime<Utc>),
    Text(&'a str),
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Minimal => 0,
            SortKey::Number(_) => 1,
            SortKey::Date(_) => 2,
            SortKey::Text(_) => 3,
        }
    }

    pub fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortKey::Number(a), SortKey::Number(b)) => a.total_cmp(b),
            (SortKey::Date(a), SortKey::Date(b)) => a.cmp(b),
            (SortKey::Text(a), SortKey::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
