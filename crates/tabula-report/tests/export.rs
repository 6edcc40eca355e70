//! Integration tests for view export.

use std::fs;
use std::io::Cursor;
use std::num::NonZeroUsize;

use calamine::{Data, Range, Reader, Xlsx, open_workbook_from_rs};
use chrono::{TimeZone, Utc};
use tabula_core::derive_view;
use tabula_model::{FieldValue, Filter, Record, RecordId, ViewKind, ViewPreset};
use tabula_report::{ExportFormat, ExportOptions, export_view, render_rows, write_artifact};
use tempfile::tempdir;

fn inquiry(id: u64, name: &str, phone: Option<&str>, day: u32, hour: u32, minute: u32) -> Record {
    let mut record = Record::new(RecordId::from(id))
        .field("name", FieldValue::text(name))
        .field(
            "createdAt",
            FieldValue::Date(Utc.with_ymd_and_hms(2024, 5, day, hour, minute, 0).unwrap()),
        );
    if let Some(phone) = phone {
        record = record.field("phone", FieldValue::text(phone));
    }
    record
}

fn inquiries() -> Vec<Record> {
    vec![
        inquiry(1, "Ana Lima", Some("555-0100"), 1, 9, 15),
        inquiry(2, "Ben Okafor", Some("555-0101"), 3, 17, 40),
        inquiry(3, "Cy", None, 2, 8, 0),
    ]
}

fn options(rows_per_page: usize) -> ExportOptions {
    ExportOptions {
        rows_per_page: NonZeroUsize::new(rows_per_page).unwrap(),
    }
}

fn preset() -> ViewPreset {
    ViewKind::Inquiries.preset()
}

fn sheet(bytes: Vec<u8>, name: &str) -> Range<Data> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    workbook.worksheet_range(name).unwrap()
}

fn sheet_rows(range: &Range<Data>, columns: usize) -> Vec<Vec<String>> {
    (0..range.height() as u32)
        .map(|row| {
            (0..columns as u32)
                .map(|col| {
                    range
                        .get_value((row, col))
                        .map(|value| value.to_string())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect()
}

/// Strings drawn with `Tj`, in content order.
fn pdf_text(bytes: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(bytes);
    let mut shown = Vec::new();
    let mut rest = text.as_ref();
    while let Some(end) = rest.find(") Tj") {
        if let Some(start) = rest[..end].rfind('(') {
            shown.push(rest[start + 1..end].to_string());
        }
        rest = &rest[end + 4..];
    }
    shown
}

#[test]
fn document_pages_repeat_the_header() {
    let records = inquiries();
    let preset = preset();
    let view = derive_view(
        &records,
        &preset.search(),
        &Filter::new(),
        preset.default_sort.as_ref(),
    );
    let artifact = export_view(&view, &preset, ExportFormat::Document, &options(2)).unwrap();
    assert_eq!(artifact.file_name, "inquiries_list.pdf");
    assert_eq!(artifact.rows, 3);
    assert!(artifact.bytes.starts_with(b"%PDF-"));

    insta::assert_snapshot!(pdf_text(&artifact.bytes).join("\n"));
}

#[test]
fn exports_cover_the_whole_filtered_view() {
    let records: Vec<Record> = (1..=23)
        .map(|n| inquiry(n, &format!("Caller {n}"), Some("555-0000"), 1 + (n as u32 % 28), 12, 0))
        .collect();
    let preset = preset();
    let view = derive_view(&records, &preset.search(), &Filter::new(), None);

    for format in ExportFormat::ALL {
        let artifact = export_view(&view, &preset, format, &options(10)).unwrap();
        assert_eq!(artifact.rows, view.len(), "{format}");
    }

    let searched = derive_view(
        &records,
        &preset.search().with_term("caller 2"),
        &Filter::new(),
        None,
    );
    let artifact = export_view(&searched, &preset, ExportFormat::Spreadsheet, &options(10)).unwrap();
    // "Caller 2" and "Caller 20" through "Caller 23".
    assert_eq!(artifact.rows, 5);
    assert_eq!(sheet(artifact.bytes, "Inquiries").height(), 6);

    let document = export_view(&searched, &preset, ExportFormat::Document, &options(2)).unwrap();
    let shown = pdf_text(&document.bytes);
    assert!(shown.contains(&"Page 3 of 3".to_string()));
    assert_eq!(shown.iter().filter(|text| text.starts_with("Caller")).count(), 5);
}

#[test]
fn both_formats_carry_the_same_cell_text() {
    let records = inquiries();
    let preset = preset();
    let view = derive_view(
        &records,
        &preset.search(),
        &Filter::new(),
        preset.default_sort.as_ref(),
    );
    let table = render_rows(view.records(), &preset.columns);
    assert_eq!(table.rows[0][0], "Ben Okafor");
    assert_eq!(table.rows[1][1], "");

    let workbook = export_view(&view, &preset, ExportFormat::Spreadsheet, &options(50)).unwrap();
    let range = sheet(workbook.bytes, "Inquiries");
    let mut expected = vec![table.headers.clone()];
    expected.extend(table.rows.iter().cloned());
    assert_eq!(sheet_rows(&range, table.headers.len()), expected);

    let document = export_view(&view, &preset, ExportFormat::Document, &options(50)).unwrap();
    let shown = pdf_text(&document.bytes);
    let cells: Vec<String> = expected
        .iter()
        .flatten()
        .filter(|text| !text.is_empty())
        .cloned()
        .collect();
    assert_eq!(shown[0], "Inquiries Management");
    assert_eq!(shown[1..shown.len() - 1], cells[..]);
    assert_eq!(shown.last().map(String::as_str), Some("Page 1 of 1"));
}

#[test]
fn empty_view_exports_only_the_header() {
    let preset = ViewKind::Jobs.preset();
    let records: Vec<Record> = Vec::new();
    let view = derive_view(&records, &preset.search(), &Filter::new(), None);

    let artifact = export_view(&view, &preset, ExportFormat::Spreadsheet, &options(10)).unwrap();
    assert_eq!(artifact.file_name, "jobs_list.xlsx");
    assert_eq!(artifact.rows, 0);
    let range = sheet(artifact.bytes, "Jobs");
    assert_eq!(range.height(), 1);
    assert_eq!(
        range.get_value((0, 0)).map(ToString::to_string).as_deref(),
        Some("Title")
    );

    let document = export_view(&view, &preset, ExportFormat::Document, &options(10)).unwrap();
    let shown = pdf_text(&document.bytes);
    assert_eq!(shown.first().map(String::as_str), Some("Job Listings"));
    assert!(shown.contains(&"Title".to_string()));
    assert_eq!(shown.last().map(String::as_str), Some("Page 1 of 1"));
}

#[test]
fn artifacts_are_written_under_their_fixed_names() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("exports");
    let records = inquiries();
    let preset = preset();
    let view = derive_view(&records, &preset.search(), &Filter::new(), None);

    for format in ExportFormat::ALL {
        let artifact = export_view(&view, &preset, format, &options(10)).unwrap();
        let path = write_artifact(&out, &artifact).unwrap();
        assert_eq!(path, out.join(format.file_name("inquiries_list")));
        assert_eq!(fs::read(&path).unwrap(), artifact.bytes);
    }

    let mut written: Vec<_> = fs::read_dir(&out)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    written.sort();
    assert_eq!(written, ["inquiries_list.pdf", "inquiries_list.xlsx"]);
}
