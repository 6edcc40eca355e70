//! Built-in view presets for the admin screens.
//!
//! A preset bundles everything a screen needs to browse and export one record
//! collection: the schema, which fields are searchable and filterable, the
//! default sort, the export columns, and the fixed export file names.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{FieldKind, ModelError, Schema, SearchSpec, SortSpec};

/// The record collections the console knows how to browse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Job postings.
    Jobs,
    /// Applications submitted against job postings.
    Applications,
    /// Contact inquiries.
    Inquiries,
}

impl ViewKind {
    pub const ALL: [ViewKind; 3] = [ViewKind::Jobs, ViewKind::Applications, ViewKind::Inquiries];

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewKind::Jobs => "jobs",
            ViewKind::Applications => "applications",
            ViewKind::Inquiries => "inquiries",
        }
    }

    pub fn preset(self) -> ViewPreset {
        match self {
            ViewKind::Jobs => jobs(),
            ViewKind::Applications => applications(),
            ViewKind::Inquiries => inquiries(),
        }
    }
}

impl fmt::Display for ViewKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "jobs" => Ok(ViewKind::Jobs),
            "applications" => Ok(ViewKind::Applications),
            "inquiries" => Ok(ViewKind::Inquiries),
            _ => Err(ModelError::UnknownView(s.to_string())),
        }
    }
}

/// How a column pulls its raw values out of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Accessor {
    Field { name: String },
    /// Several fields rendered side by side; missing parts are skipped.
    Joined {
        names: Vec<String>,
        separator: String,
    },
}

/// How a column turns a value into cell text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CellFormat {
    /// The value's canonical text.
    Plain,
    /// A `chrono` strftime pattern applied to date values.
    Date { pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub label: String,
    pub accessor: Accessor,
    pub format: CellFormat,
    /// Text used when the accessor yields nothing renderable.
    pub fallback: String,
}

impl Column {
    pub fn field(label: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            accessor: Accessor::Field { name: name.into() },
            format: CellFormat::Plain,
            fallback: String::new(),
        }
    }

    pub fn joined<I, S>(label: impl Into<String>, names: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            label: label.into(),
            accessor: Accessor::Joined {
                names: names.into_iter().map(Into::into).collect(),
                separator: separator.to_string(),
            },
            format: CellFormat::Plain,
            fallback: String::new(),
        }
    }

    #[must_use]
    pub fn date(mut self, pattern: &str) -> Self {
        self.format = CellFormat::Date {
            pattern: pattern.to_string(),
        };
        self
    }

    #[must_use]
    pub fn or(mut self, fallback: &str) -> Self {
        self.fallback = fallback.to_string();
        self
    }
}

/// Fixed export naming for a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportNames {
    /// File stem shared by both export formats (e.g. `inquiries_list`).
    pub base_name: String,
    /// Worksheet name in the spreadsheet export.
    pub sheet_name: String,
    /// Title printed on every page of the document export.
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewPreset {
    pub kind: ViewKind,
    pub schema: Schema,
    pub search_fields: Vec<String>,
    pub filter_fields: Vec<String>,
    /// Field counted by status in the collection summary.
    pub status_field: Option<String>,
    pub default_sort: Option<SortSpec>,
    /// Short names accepted for fields, e.g. `date` for `createdAt`.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    pub columns: Vec<Column>,
    pub export: ExportNames,
}

impl ViewPreset {
    /// An empty search over this preset's searchable fields.
    pub fn search(&self) -> SearchSpec {
        SearchSpec::new(self.search_fields.iter().cloned())
    }

    /// Map a user-supplied field name to a declared field.
    ///
    /// Accepts declared field names, aliases, and labels of single-field
    /// columns. Aliases and labels match case-insensitively.
    pub fn resolve_field(&self, name: &str) -> Result<String, ModelError> {
        let name = name.trim();
        if name == self.schema.id_field || self.schema.kind_of(name).is_some() {
            return Ok(name.to_string());
        }
        let alias = self
            .aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .map(|(_, field)| field.clone());
        let label = || {
            self.columns.iter().find_map(|column| match &column.accessor {
                Accessor::Field { name: field } if column.label.eq_ignore_ascii_case(name) => {
                    Some(field.clone())
                }
                _ => None,
            })
        };
        alias.or_else(label).ok_or_else(|| ModelError::UnknownField {
            view: self.kind.to_string(),
            field: name.to_string(),
        })
    }
}

fn date_alias() -> BTreeMap<String, String> {
    BTreeMap::from([("date".to_string(), "createdAt".to_string())])
}

const JOB_STATUSES: [&str; 2] = ["Open", "Closed"];
const JOB_TYPES: [&str; 4] = ["Full-time", "Part-time", "Contract", "Internship"];
const APPLICATION_STATUSES: [&str; 4] = ["Pending", "Reviewing", "Shortlisted", "Rejected"];

fn jobs() -> ViewPreset {
    ViewPreset {
        kind: ViewKind::Jobs,
        schema: Schema::new("_id")
            .with("title", FieldKind::Text)
            .with("department", FieldKind::Text)
            .with("type", FieldKind::status(JOB_TYPES))
            .with("location", FieldKind::Text)
            .with("experience", FieldKind::Text)
            .with("salary", FieldKind::Text)
            .with("openings", FieldKind::Number)
            .with("status", FieldKind::status(JOB_STATUSES))
            .with("createdAt", FieldKind::Date),
        search_fields: vec!["title".into(), "department".into()],
        filter_fields: vec!["department".into(), "type".into(), "status".into()],
        status_field: Some("status".into()),
        default_sort: None,
        aliases: date_alias(),
        columns: vec![
            Column::field("Title", "title"),
            Column::field("Department", "department"),
            Column::field("Type", "type"),
            Column::field("Location", "location"),
            Column::field("Experience", "experience"),
            Column::field("Salary", "salary"),
            Column::field("Openings", "openings").or("0"),
            Column::field("Status", "status"),
        ],
        export: ExportNames {
            base_name: "jobs_list".into(),
            sheet_name: "Jobs".into(),
            title: "Job Listings".into(),
        },
    }
}

fn applications() -> ViewPreset {
    ViewPreset {
        kind: ViewKind::Applications,
        schema: Schema::new("_id")
            .with("carrier.title", FieldKind::Text)
            .with("carrier.location", FieldKind::Text)
            .with("first_name", FieldKind::Text)
            .with("last_name", FieldKind::Text)
            .with("email", FieldKind::Text)
            .with("phone", FieldKind::Text)
            .with("status", FieldKind::status(APPLICATION_STATUSES))
            .with("resume", FieldKind::Text)
            .with("createdAt", FieldKind::Date),
        search_fields: vec![
            "carrier.title".into(),
            "first_name".into(),
            "last_name".into(),
            "email".into(),
        ],
        filter_fields: vec!["status".into(), "createdAt".into()],
        status_field: Some("status".into()),
        default_sort: None,
        aliases: date_alias(),
        columns: vec![
            Column::field("Job Title", "carrier.title").or("N/A"),
            Column::joined("Applicant", ["first_name", "last_name"], " "),
            Column::field("Email", "email"),
            Column::field("Address", "carrier.location").or("N/A"),
            Column::field("Phone", "phone"),
            Column::field("Status", "status"),
            Column::field("Applied Date", "createdAt")
                .date("%Y-%m-%d")
                .or("N/A"),
        ],
        export: ExportNames {
            base_name: "applications_list".into(),
            sheet_name: "Applications".into(),
            title: "Job Applications".into(),
        },
    }
}

fn inquiries() -> ViewPreset {
    ViewPreset {
        kind: ViewKind::Inquiries,
        schema: Schema::new("_id")
            .with("name", FieldKind::Text)
            .with("phone", FieldKind::Text)
            .with("createdAt", FieldKind::Date),
        search_fields: vec!["name".into(), "phone".into()],
        filter_fields: Vec::new(),
        status_field: None,
        default_sort: Some(SortSpec::descending("createdAt")),
        aliases: date_alias(),
        columns: vec![
            Column::field("Name", "name"),
            Column::field("Phone", "phone"),
            Column::field("Date & Time", "createdAt").date("%Y-%m-%d %H:%M:%S"),
        ],
        export: ExportNames {
            base_name: "inquiries_list".into(),
            sheet_name: "Inquiries".into(),
            title: "Inquiries Management".into(),
        },
    }
}
