use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use tabula_core::{Browser, MutationOutcome, PageItem, StoreState, StoreSummary};
use tabula_report::render_rows;

use crate::types::{ExportResult, SetFieldResult};

pub fn print_page(browser: &Browser) {
    let preset = browser.preset();
    println!(
        "{} ({} records loaded)",
        preset.export.title,
        browser.store().len()
    );
    if let StoreState::Errored(error) = browser.state() {
        eprintln!("Failed to load records: {error}");
        return;
    }
    if let Some(report) = browser.ingest_report()
        && !report.is_clean()
    {
        println!(
            "Ingest: {} skipped, {} fields degraded",
            report.skipped(),
            report.degraded_fields()
        );
    }
    if !browser.search_term().is_empty() {
        println!("Search: {:?}", browser.search_term());
    }
    for (field, expected) in browser.filter().active() {
        println!("Filter: {field} = {expected}");
    }
    if let Some(sort) = browser.sort() {
        println!("Sorted by {} ({})", sort.field, sort.direction);
    }

    let page = browser.page();
    if page.items.is_empty() {
        println!("No records match.");
    } else {
        let rendered = render_rows(&page.items, &preset.columns);
        let mut table = Table::new();
        let mut header = vec![header_cell("ID")];
        header.extend(rendered.headers.iter().map(|label| header_cell(label)));
        table.set_header(header);
        apply_table_style(&mut table);
        for (record, cells) in page.items.iter().zip(rendered.rows) {
            let mut row = vec![dim_cell(record.id())];
            row.extend(cells.into_iter().map(Cell::new));
            table.add_row(row);
        }
        println!("{table}");
    }

    println!("{}", page.showing());
    println!("Pages: {}", page_index(&browser.page_range(), page.current_page));
}

pub fn print_status_summary(summary: &StoreSummary) {
    if summary.by_status.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![header_cell("Status"), header_cell("Records")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for (status, count) in &summary.by_status {
        table.add_row(vec![Cell::new(status), Cell::new(count)]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(summary.total).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");
}

pub fn print_export(result: &ExportResult) {
    println!("Exported {} {} records", result.rows, result.view);
    for path in &result.files {
        println!("- {}", path.display());
    }
}

pub fn print_set_field(result: &SetFieldResult) {
    match &result.outcome {
        MutationOutcome::Confirmed => println!(
            "Updated {} of record {} to {:?}",
            result.field, result.id, result.requested
        ),
        MutationOutcome::RolledBack { error } => {
            eprintln!(
                "Update of {} on record {} failed: {error}",
                result.field, result.id
            );
            eprintln!("Value kept at {:?}; the update can be retried.", result.current);
        }
    }
}

/// `1 2 [3] 4 5 ... 20`
fn page_index(items: &[PageItem], current: usize) -> String {
    items
        .iter()
        .map(|item| match item {
            PageItem::Page(number) if *number == current => format!("[{number}]"),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(160);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_index_marks_the_current_page() {
        let items = tabula_core::page_range(7, 20, 2);
        assert_eq!(page_index(&items, 7), "1 ... 5 6 [7] 8 9 ... 20");
        assert_eq!(page_index(&[PageItem::Page(1)], 1), "[1]");
    }
}
