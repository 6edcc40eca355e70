//! Schema validation of fetched records.
//!
//! Raw JSON records are flattened (nested objects become dotted paths, scalar
//! arrays are joined) and every field is converted once according to the view
//! schema. Problems never abort ingestion: they are collected into an
//! [`IngestReport`] and the offending value is kept as
//! [`FieldValue::Malformed`] or the record is skipped.

use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;
use tabula_model::{FieldKind, FieldValue, Record, RecordId, Schema};
use tracing::{debug, warn};

/// Separator used when a source array is flattened into one text value.
pub const ARRAY_SEPARATOR: &str = ", ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Source item was not a JSON object.
    NotAnObject,
    /// Record has no usable id; it was skipped.
    MissingId,
    /// Id already seen earlier in the collection; the later record was skipped.
    DuplicateId(RecordId),
    /// Value did not parse for the declared field kind.
    Malformed { field: String, raw: String },
    /// Status value outside the enumerated list.
    UnknownStatus { field: String, value: String },
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::NotAnObject => f.write_str("record is not an object"),
            IssueKind::MissingId => f.write_str("record has no id"),
            IssueKind::DuplicateId(id) => write!(f, "duplicate id {id}"),
            IssueKind::Malformed { field, raw } => write!(f, "{field}: cannot parse '{raw}'"),
            IssueKind::UnknownStatus { field, value } => {
                write!(f, "{field}: '{value}' is not a known status")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestIssue {
    /// Position of the record in the fetched collection.
    pub index: usize,
    pub kind: IssueKind,
}

impl IngestIssue {
    /// Whether the record was dropped rather than kept with a degraded field.
    pub fn is_skip(&self) -> bool {
        matches!(
            self.kind,
            IssueKind::NotAnObject | IssueKind::MissingId | IssueKind::DuplicateId(_)
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub received: usize,
    pub issues: Vec<IngestIssue>,
}

impl IngestReport {
    pub fn skipped(&self) -> usize {
        self.issues.iter().filter(|issue| issue.is_skip()).count()
    }

    pub fn degraded_fields(&self) -> usize {
        self.issues.len() - self.skipped()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Validate a fetched collection against `schema`.
pub fn ingest(items: Vec<Value>, schema: &Schema) -> (Vec<Record>, IngestReport) {
    let mut report = IngestReport {
        received: items.len(),
        issues: Vec::new(),
    };
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(_) = item else {
            report.issues.push(IngestIssue {
                index,
                kind: IssueKind::NotAnObject,
            });
            continue;
        };
        let mut flat = Vec::new();
        flatten("", item, &mut flat);

        let Some(id) = extract_id(&flat, &schema.id_field) else {
            report.issues.push(IngestIssue {
                index,
                kind: IssueKind::MissingId,
            });
            continue;
        };
        if !seen.insert(id.clone()) {
            report.issues.push(IngestIssue {
                index,
                kind: IssueKind::DuplicateId(id),
            });
            continue;
        }

        let mut record = Record::new(id);
        for (name, raw) in flat {
            if name == schema.id_field {
                continue;
            }
            let value = match schema.kind_of(&name) {
                Some(kind) => convert(&name, kind, raw, index, &mut report),
                None => convert_untyped(raw),
            };
            record = record.field(name, value);
        }
        records.push(record);
    }

    if report.is_clean() {
        debug!(records = records.len(), "Ingested collection");
    } else {
        warn!(
            records = records.len(),
            skipped = report.skipped(),
            degraded = report.degraded_fields(),
            "Ingested collection with issues"
        );
    }
    (records, report)
}

/// Convert free text to a value of the field's declared kind.
///
/// Used for edits typed by an operator; fields the schema does not declare
/// are stored as text.
pub fn coerce(schema: &Schema, field: &str, raw: &str) -> FieldValue {
    let value = Value::String(raw.to_string());
    match schema.kind_of(field) {
        Some(kind) => {
            let mut report = IngestReport::default();
            convert(field, kind, value, 0, &mut report)
        }
        None => convert_untyped(value),
    }
}

/// Parse the timestamp shapes the backend produces.
///
/// RFC 3339 (`2024-01-02T10:00:00.000Z`), naive date-times taken as UTC, and
/// plain dates at midnight UTC.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed.and_utc());
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn flatten(prefix: &str, value: Value, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, out);
            }
        }
        Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(scalar_text)
                .collect::<Vec<_>>()
                .join(ARRAY_SEPARATOR);
            out.push((prefix.to_string(), Value::String(joined)));
        }
        scalar => out.push((prefix.to_string(), scalar)),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn extract_id(flat: &[(String, Value)], id_field: &str) -> Option<RecordId> {
    let (_, raw) = flat.iter().find(|(name, _)| name == id_field)?;
    match raw {
        Value::String(text) => RecordId::new(text.as_str()).ok(),
        Value::Number(number) => RecordId::new(number.to_string()).ok(),
        _ => None,
    }
}

fn convert(
    field: &str,
    kind: &FieldKind,
    raw: Value,
    index: usize,
    report: &mut IngestReport,
) -> FieldValue {
    if raw.is_null() {
        return FieldValue::Missing;
    }
    let converted = match (kind, &raw) {
        (FieldKind::Text, _) => scalar_text(&raw).map(FieldValue::Text),
        (FieldKind::Number, Value::Number(number)) => number.as_f64().map(FieldValue::Number),
        (FieldKind::Number, Value::String(text)) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|number| number.is_finite())
            .map(FieldValue::Number),
        (FieldKind::Date, Value::String(text)) => parse_timestamp(text).map(FieldValue::Date),
        (FieldKind::Date, Value::Number(number)) => number
            .as_i64()
            .and_then(DateTime::from_timestamp_millis)
            .map(FieldValue::Date),
        (FieldKind::Status { allowed }, Value::String(text)) => {
            if allowed.is_empty() || allowed.iter().any(|status| status == text) {
                Some(FieldValue::Status(text.clone()))
            } else {
                report.issues.push(IngestIssue {
                    index,
                    kind: IssueKind::UnknownStatus {
                        field: field.to_string(),
                        value: text.clone(),
                    },
                });
                return FieldValue::Malformed(text.clone());
            }
        }
        _ => None,
    };
    converted.unwrap_or_else(|| {
        let text = scalar_text(&raw).unwrap_or_default();
        report.issues.push(IngestIssue {
            index,
            kind: IssueKind::Malformed {
                field: field.to_string(),
                raw: text.clone(),
            },
        });
        FieldValue::Malformed(text)
    })
}

fn convert_untyped(raw: Value) -> FieldValue {
    match raw {
        Value::Null => FieldValue::Missing,
        Value::Number(number) => number
            .as_f64()
            .map(FieldValue::Number)
            .unwrap_or(FieldValue::Missing),
        Value::String(text) => FieldValue::Text(text),
        other => scalar_text(&other)
            .map(FieldValue::Text)
            .unwrap_or(FieldValue::Missing),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;
    use tabula_model::ViewKind;

    use super::*;

    #[test]
    fn flattens_nested_objects_and_arrays() {
        let schema = ViewKind::Applications.preset().schema;
        let (records, report) = ingest(
            vec![json!({
                "_id": "a1",
                "carrier": {"title": "Welder", "location": "Pune"},
                "skills": ["welding", "safety"],
                "status": "Pending"
            })],
            &schema,
        );
        assert!(report.is_clean());
        let record = &records[0];
        assert_eq!(record.get("carrier.title"), &FieldValue::text("Welder"));
        assert_eq!(record.get("skills"), &FieldValue::text("welding, safety"));
        assert_eq!(record.get("status"), &FieldValue::status("Pending"));
        assert!(record.get("_id").is_missing());
    }

    #[test]
    fn malformed_values_are_kept_and_reported() {
        let schema = ViewKind::Jobs.preset().schema;
        let (records, report) = ingest(
            vec![json!({
                "_id": 1,
                "openings": "several",
                "createdAt": "yesterday",
                "status": "Paused"
            })],
            &schema,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(report.degraded_fields(), 3);
        assert_eq!(report.skipped(), 0);
        let record = &records[0];
        assert_eq!(record.get("openings"), &FieldValue::Malformed("several".into()));
        assert_eq!(record.get("status"), &FieldValue::Malformed("Paused".into()));
    }

    #[test]
    fn skips_records_without_unique_ids() {
        let schema = Schema::new("_id");
        let (records, report) = ingest(
            vec![
                json!({"_id": "x", "name": "first"}),
                json!({"_id": "x", "name": "second"}),
                json!({"name": "anonymous"}),
                json!("not a record"),
            ],
            &schema,
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("name"), &FieldValue::text("first"));
        assert_eq!(report.skipped(), 3);
        assert_eq!(report.received, 4);
    }

    #[test]
    fn parses_backend_timestamp_shapes() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 10, 30, 0).unwrap();
        assert_eq!(parse_timestamp("2024-01-02T10:30:00.000Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02T10:30:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-01-02 10:30:00"), Some(expected));
        assert_eq!(
            parse_timestamp("2024-01-02"),
            Some(Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp("02/01/2024"), None);
    }

    #[test]
    fn coerces_operator_input_by_schema() {
        let schema = ViewKind::Jobs.preset().schema;
        assert_eq!(coerce(&schema, "openings", "4"), FieldValue::Number(4.0));
        assert_eq!(coerce(&schema, "status", "Closed"), FieldValue::status("Closed"));
        assert_eq!(
            coerce(&schema, "status", "Archived"),
            FieldValue::Malformed("Archived".into())
        );
        assert_eq!(coerce(&schema, "notes", "hi"), FieldValue::text("hi"));
    }
}
