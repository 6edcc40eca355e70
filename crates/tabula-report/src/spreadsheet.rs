//! Excel workbook writer.
//!
//! The output is an `.xlsx` workbook with one worksheet, a bold frozen header
//! row of column labels, and one row per record. Every cell is written as a
//! string so the text matches the PDF export exactly.

use rust_xlsxwriter::{DocProperties, Format, Workbook};

use crate::error::Result;
use crate::render::RenderedTable;

/// Longest worksheet name spreadsheet applications accept.
const MAX_SHEET_NAME: usize = 31;

/// Encode `table` as a workbook with a single sheet named `sheet`.
pub fn write_workbook(table: &RenderedTable, sheet: &str, title: &str) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    workbook.set_properties(&DocProperties::new().set_title(title));
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name(sheet))?;
    for (col, label) in (0u16..).zip(&table.headers) {
        worksheet.write_string_with_format(0, col, label, &header)?;
    }
    for (row, cells) in (1u32..).zip(&table.rows) {
        for (col, text) in (0u16..).zip(cells) {
            // Blank cells stay unwritten.
            if !text.is_empty() {
                worksheet.write_string(row, col, text)?;
            }
        }
    }
    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}

/// Replace characters that are not allowed in worksheet names and cut the
/// name to the accepted length.
pub fn sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|ch| match ch {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'');
    if cleaned.is_empty() {
        "Sheet1".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use calamine::{Data, Reader, Xlsx, open_workbook_from_rs};

    use super::*;

    fn table() -> RenderedTable {
        RenderedTable {
            headers: vec!["Name".into(), "Phone".into()],
            rows: vec![
                vec!["Ana".into(), "555-0100".into()],
                vec!["Tom & Jerry".into(), String::new()],
            ],
        }
    }

    fn read_back(bytes: Vec<u8>, sheet: &str) -> calamine::Range<Data> {
        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
        workbook.worksheet_range(sheet).unwrap()
    }

    fn text(range: &calamine::Range<Data>, row: u32, col: u32) -> String {
        range
            .get_value((row, col))
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    #[test]
    fn workbook_has_header_and_one_row_per_record() {
        let bytes = write_workbook(&table(), "Inquiries", "Inquiries Management").unwrap();
        assert!(bytes.starts_with(b"PK"), "xlsx is a zip container");

        let range = read_back(bytes, "Inquiries");
        assert_eq!(range.height(), 3);
        assert_eq!(text(&range, 0, 0), "Name");
        assert_eq!(text(&range, 1, 1), "555-0100");
        assert_eq!(text(&range, 2, 0), "Tom & Jerry");
        assert_eq!(text(&range, 2, 1), "");
    }

    #[test]
    fn unsafe_sheet_names_still_produce_a_workbook() {
        let bytes = write_workbook(&table(), "Q1/Q2 [draft]", "Report").unwrap();
        let range = read_back(bytes, "Q1_Q2 _draft_");
        assert_eq!(text(&range, 1, 0), "Ana");
    }

    #[test]
    fn sheet_names_are_sanitised() {
        assert_eq!(sheet_name("Jobs"), "Jobs");
        assert_eq!(sheet_name("Q1/Q2 [draft]"), "Q1_Q2 _draft_");
        assert_eq!(sheet_name("'quoted'"), "quoted");
        assert_eq!(sheet_name("   "), "Sheet1");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), MAX_SHEET_NAME);
    }
}
