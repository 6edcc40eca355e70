//! Paged PDF table writer.
//!
//! Rows are split into A4 landscape pages. Every page starts with the
//! document title and a shaded header row, draws the rows as a ruled grid,
//! and ends with a `Page i of n` footer. An empty view still produces one
//! page with the header.
//!
//! Text uses the built-in Helvetica faces, so no font files are embedded and
//! content streams are left uncompressed.

use std::num::NonZeroUsize;

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::render::RenderedTable;

pub const DEFAULT_ROWS_PER_PAGE: NonZeroUsize = NonZeroUsize::new(25).unwrap();

/// Most data rows that fit below the title on one page. Larger page sizes
/// are capped to this.
pub const MAX_ROWS_PER_PAGE: usize = 28;

const PAGE_WIDTH: f32 = 841.89;
const PAGE_HEIGHT: f32 = 595.28;
const MARGIN: f32 = 36.0;
const TITLE_SIZE: f32 = 14.0;
const FONT_SIZE: f32 = 9.0;
const ROW_HEIGHT: f32 = 16.0;
const CELL_PADDING: f32 = 4.0;
const BASELINE_OFFSET: f32 = 5.0;
const TITLE_BASELINE: f32 = PAGE_HEIGHT - MARGIN - TITLE_SIZE;
const TABLE_TOP: f32 = TITLE_BASELINE - 16.0;
/// Lowest y the grid may reach; the footer sits below it.
const TABLE_FLOOR: f32 = MARGIN + 20.0;
const TABLE_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
/// Narrowest column, in characters.
const MIN_COLUMN_CHARS: usize = 4;

const REGULAR: Name<'static> = Name(b"F1");
const BOLD: Name<'static> = Name(b"F2");

pub fn write_document(table: &RenderedTable, title: &str, rows_per_page: NonZeroUsize) -> Vec<u8> {
    let per_page = rows_per_page.get().min(MAX_ROWS_PER_PAGE);
    let pages: Vec<&[Vec<String>]> = if table.rows.is_empty() {
        vec![table.rows.as_slice()]
    } else {
        table.rows.chunks(per_page).collect()
    };
    let total = pages.len();
    let widths = column_widths(table);

    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let regular_id = Ref::new(3);
    let bold_id = Ref::new(4);
    let page_id = |index: usize| Ref::new(5 + 2 * index as i32);
    let content_id = |index: usize| Ref::new(6 + 2 * index as i32);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids((0..total).map(page_id))
        .count(total as i32);
    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    for (index, rows) in pages.iter().enumerate() {
        let mut page = pdf.page(page_id(index));
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        page.parent(tree_id);
        page.contents(content_id(index));
        page.resources()
            .fonts()
            .pair(REGULAR, regular_id)
            .pair(BOLD, bold_id);
        page.finish();

        let content = draw_page(title, &table.headers, rows, &widths, index + 1, total);
        pdf.stream(content_id(index), &content);
    }
    pdf.finish()
}

fn draw_page(
    title: &str,
    headers: &[String],
    rows: &[Vec<String>],
    widths: &[f32],
    page: usize,
    total: usize,
) -> Vec<u8> {
    let mut content = Content::new();
    show_text(&mut content, BOLD, TITLE_SIZE, MARGIN, TITLE_BASELINE, title);

    content.set_fill_gray(0.88);
    content.rect(MARGIN, TABLE_TOP - ROW_HEIGHT, TABLE_WIDTH, ROW_HEIGHT);
    content.fill_nonzero();
    content.set_fill_gray(0.0);

    draw_row(&mut content, BOLD, headers, widths, TABLE_TOP);
    for (offset, cells) in rows.iter().enumerate() {
        let top = TABLE_TOP - ROW_HEIGHT * (offset + 1) as f32;
        draw_row(&mut content, REGULAR, cells, widths, top);
    }

    let bottom = TABLE_TOP - ROW_HEIGHT * (rows.len() + 1) as f32;
    content.set_line_width(0.5);
    for line in 0..=rows.len() + 1 {
        let y = TABLE_TOP - ROW_HEIGHT * line as f32;
        content.move_to(MARGIN, y);
        content.line_to(MARGIN + TABLE_WIDTH, y);
    }
    let mut x = MARGIN;
    content.move_to(x, TABLE_TOP);
    content.line_to(x, bottom);
    for width in widths {
        x += width;
        content.move_to(x, TABLE_TOP);
        content.line_to(x, bottom);
    }
    content.stroke();

    let footer = format!("Page {page} of {total}");
    show_text(&mut content, REGULAR, FONT_SIZE, MARGIN, MARGIN, &footer);
    content.finish()
}

/// Draw one row whose top edge is at `top`. Text is clipped to its cell.
fn draw_row(content: &mut Content, font: Name<'_>, cells: &[String], widths: &[f32], top: f32) {
    let bottom = top - ROW_HEIGHT;
    let mut x = MARGIN;
    for (text, width) in cells.iter().zip(widths) {
        if !text.is_empty() {
            content.save_state();
            content.rect(x, bottom, *width, ROW_HEIGHT);
            content.clip_nonzero();
            content.end_path();
            show_text(
                content,
                font,
                FONT_SIZE,
                x + CELL_PADDING,
                bottom + BASELINE_OFFSET,
                text,
            );
            content.restore_state();
        }
        x += width;
    }
}

fn show_text(content: &mut Content, font: Name<'_>, size: f32, x: f32, y: f32, text: &str) {
    content.begin_text();
    content.set_font(font, size);
    content.next_line(x, y);
    content.show(Str(&win_ansi(text)));
    content.end_text();
}

/// Split the table width between columns in proportion to their longest text.
fn column_widths(table: &RenderedTable) -> Vec<f32> {
    let chars: Vec<usize> = table
        .headers
        .iter()
        .enumerate()
        .map(|(col, header)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(col))
                .chain(std::iter::once(header))
                .map(|text| text.chars().count())
                .max()
                .unwrap_or(0)
                .max(MIN_COLUMN_CHARS)
        })
        .collect();
    let sum = chars.iter().sum::<usize>().max(1) as f32;
    chars
        .iter()
        .map(|&count| TABLE_WIDTH * count as f32 / sum)
        .collect()
}

/// Encode text for the standard fonts' WinAnsi encoding. Characters it
/// cannot represent become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            ' '..='~' | '\u{A0}'..='\u{FF}' => ch as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            ch if ch.is_whitespace() => b' ',
            _ => b'?',
        })
        .collect()
}
