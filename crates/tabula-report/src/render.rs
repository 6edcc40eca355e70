//! Cell rendering shared by every export format.

use std::fmt::Write;

use tabula_model::{Accessor, CellFormat, Column, FieldValue, Record};

/// Header labels plus one row of cell text per record, in view order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RenderedTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn render_rows(records: &[&Record], columns: &[Column]) -> RenderedTable {
    RenderedTable {
        headers: columns.iter().map(|column| column.label.clone()).collect(),
        rows: records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| render_cell(record, column))
                    .collect()
            })
            .collect(),
    }
}

/// Text of one cell. Never fails: anything that renders empty becomes the
/// column fallback.
pub fn render_cell(record: &Record, column: &Column) -> String {
    let text = match &column.accessor {
        Accessor::Field { name } => format_value(record.get(name), &column.format),
        Accessor::Joined { names, separator } => {
            let parts: Vec<String> = names
                .iter()
                .filter_map(|name| format_value(record.get(name), &column.format))
                .collect();
            (!parts.is_empty()).then(|| parts.join(separator))
        }
    };
    text.unwrap_or_else(|| column.fallback.clone())
}

fn format_value(value: &FieldValue, format: &CellFormat) -> Option<String> {
    match value {
        FieldValue::Missing | FieldValue::Malformed(_) => None,
        FieldValue::Date(date) => match format {
            CellFormat::Date { pattern } => {
                let mut out = String::new();
                // An invalid pattern surfaces as a formatting error.
                write!(out, "{}", date.format(pattern)).ok()?;
                non_empty(out)
            }
            CellFormat::Plain => non_empty(value.display_text().into_owned()),
        },
        _ => non_empty(value.display_text().trim().to_string()),
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use tabula_model::{RecordId, ViewKind};

    use super::*;

    fn applicant(first: Option<&str>, last: Option<&str>) -> Record {
        let mut record = Record::new(RecordId::from(1));
        if let Some(first) = first {
            record = record.field("first_name", FieldValue::text(first));
        }
        if let Some(last) = last {
            record = record.field("last_name", FieldValue::text(last));
        }
        record
    }

    fn column(label: &str) -> Column {
        ViewKind::Applications
            .preset()
            .columns
            .into_iter()
            .find(|column| column.label == label)
            .unwrap()
    }

    #[test]
    fn joined_columns_skip_missing_parts() {
        let applicant_column = column("Applicant");
        assert_eq!(
            render_cell(&applicant(Some("Ana"), Some("Lima")), &applicant_column),
            "Ana Lima"
        );
        assert_eq!(
            render_cell(&applicant(Some("Ana"), None), &applicant_column),
            "Ana"
        );
        assert_eq!(render_cell(&applicant(None, None), &applicant_column), "");
    }

    #[test]
    fn missing_and_malformed_values_use_the_fallback() {
        let applied = column("Applied Date");
        let record = Record::new(RecordId::from(1));
        assert_eq!(render_cell(&record, &applied), "N/A");

        let malformed = record.field("createdAt", FieldValue::Malformed("soon".into()));
        assert_eq!(render_cell(&malformed, &applied), "N/A");
    }

    #[test]
    fn dates_follow_the_column_pattern() {
        let record = Record::new(RecordId::from(1)).field(
            "createdAt",
            FieldValue::Date(Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()),
        );
        assert_eq!(render_cell(&record, &column("Applied Date")), "2024-03-09");

        let plain = Column::field("Created", "createdAt");
        assert_eq!(render_cell(&record, &plain), "2024-03-09T14:05:00Z");
    }

    #[test]
    fn invalid_date_pattern_falls_back() {
        let record = Record::new(RecordId::from(1)).field(
            "createdAt",
            FieldValue::Date(Utc.with_ymd_and_hms(2024, 3, 9, 0, 0, 0).unwrap()),
        );
        let broken = Column::field("Created", "createdAt").date("%Q").or("?");
        assert_eq!(render_cell(&record, &broken), "?");
    }

    #[test]
    fn numbers_render_without_trailing_zeroes() {
        let record = Record::new(RecordId::from(1)).field("openings", FieldValue::Number(3.0));
        let openings = Column::field("Openings", "openings").or("0");
        assert_eq!(render_cell(&record, &openings), "3");
        assert_eq!(render_cell(&Record::new(RecordId::from(2)), &openings), "0");
    }
}
