//! Client-side pagination and the compressed page-index control.

use std::collections::BTreeSet;
use std::fmt;
use std::num::NonZeroUsize;

/// Window half-width used by the page-index control.
pub const DEFAULT_PAGE_WINDOW: usize = 2;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: NonZeroUsize = NonZeroUsize::new(10).unwrap();

/// `max(1, ceil(len / page_size))`.
pub fn total_pages(len: usize, page_size: NonZeroUsize) -> usize {
    len.div_ceil(page_size.get()).max(1)
}

/// One page of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub page_size: NonZeroUsize,
}

/// "Showing `first` to `last` of `of` results" (1-based, inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Showing {
    pub first: usize,
    pub last: usize,
    pub of: usize,
}

impl fmt::Display for Showing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Showing {} to {} of {} results",
            self.first, self.last, self.of
        )
    }
}

impl<T> PageSlice<T> {
    pub fn showing(&self) -> Showing {
        let offset = (self.current_page - 1) * self.page_size.get();
        Showing {
            first: if self.items.is_empty() { 0 } else { offset + 1 },
            last: offset + self.items.len(),
            of: self.total_items,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// `view[(current_page - 1) * page_size .. current_page * page_size]`.
///
/// `current_page` is clamped into `[1, total_pages]` first.
pub fn slice<T: Clone>(view: &[T], page_size: NonZeroUsize, current_page: usize) -> PageSlice<T> {
    let total_pages = total_pages(view.len(), page_size);
    let current_page = current_page.clamp(1, total_pages);
    let start = ((current_page - 1) * page_size.get()).min(view.len());
    let end = (start + page_size.get()).min(view.len());
    PageSlice {
        items: view[start..end].to_vec(),
        current_page,
        total_pages,
        total_items: view.len(),
        page_size,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageItem::Page(number) => write!(f, "{number}"),
            PageItem::Ellipsis => f.write_str("..."),
        }
    }
}

/// Compressed page-index control.
///
/// Always shows the first and last page plus a window of `delta` pages on
/// each side of `current`. The window slides away from the ends so it keeps
/// `2 * delta + 1` pages when there are enough. A gap of exactly one page is
/// filled with that page; any larger gap becomes a single ellipsis.
pub fn page_range(current: usize, total: usize, delta: usize) -> Vec<PageItem> {
    if total <= 1 {
        return vec![PageItem::Page(1)];
    }
    let current = current.clamp(1, total);
    let width = 2 * delta;
    let mut left = current.saturating_sub(delta).max(1);
    let mut right = current + delta;
    if current <= delta {
        left = 1;
        right = (1 + width).min(total);
    }
    if right > total {
        right = total;
        left = total.saturating_sub(width).max(1);
    }

    let mut shown = BTreeSet::from([1, total]);
    shown.extend(left..=right);

    let mut items = Vec::with_capacity(shown.len() + 2);
    let mut last: Option<usize> = None;
    for page in shown {
        if let Some(previous) = last {
            match page - previous {
                1 => {}
                2 => items.push(PageItem::Page(previous + 1)),
                _ => items.push(PageItem::Ellipsis),
            }
        }
        items.push(PageItem::Page(page));
        last = Some(page);
    }
    items
}

/// Page size and current page of one browsing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: NonZeroUsize,
    current_page: usize,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self {
            page_size,
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> NonZeroUsize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Changing the page size always returns to the first page.
    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.page_size = page_size;
        self.reset();
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    pub fn go_to(&mut self, page: usize, total_pages: usize) {
        self.current_page = page.clamp(1, total_pages.max(1));
    }

    pub fn next(&mut self, total_pages: usize) {
        self.go_to(self.current_page + 1, total_pages);
    }

    pub fn previous(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Re-establish `current_page <= total_pages` after the view shrank.
    pub fn clamp(&mut self, total_pages: usize) {
        self.go_to(self.current_page, total_pages);
    }
}

#[cfg(test)]
mod tests {
    use super::PageItem::{Ellipsis, Page};
    use super::*;

    fn size(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let view: Vec<usize> = (0..23).collect();
        let page = slice(&view, size(10), 2);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items, (10..20).collect::<Vec<_>>());
        assert_eq!(page.showing().to_string(), "Showing 11 to 20 of 23 results");

        let last = slice(&view, size(10), 3);
        assert_eq!(last.items, vec![20, 21, 22]);
        assert!(!last.has_next());
    }

    #[test]
    fn empty_view_has_one_empty_page() {
        let view: Vec<usize> = Vec::new();
        let page = slice(&view, size(10), 4);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 1);
        assert!(page.items.is_empty());
        assert_eq!(
            page.showing(),
            Showing {
                first: 0,
                last: 0,
                of: 0
            }
        );
    }

    #[test]
    fn range_collapses_both_sides() {
        assert_eq!(
            page_range(7, 20, 2),
            vec![
                Page(1),
                Ellipsis,
                Page(5),
                Page(6),
                Page(7),
                Page(8),
                Page(9),
                Ellipsis,
                Page(20)
            ]
        );
    }

    #[test]
    fn range_window_shifts_at_the_edges() {
        assert_eq!(
            page_range(1, 10, 2),
            vec![Page(1), Page(2), Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_range(10, 10, 2),
            vec![Page(1), Ellipsis, Page(6), Page(7), Page(8), Page(9), Page(10)]
        );
    }

    #[test]
    fn range_fills_single_page_gaps() {
        assert_eq!(
            page_range(5, 10, 2),
            vec![
                Page(1),
                Page(2),
                Page(3),
                Page(4),
                Page(5),
                Page(6),
                Page(7),
                Ellipsis,
                Page(10)
            ]
        );
    }

    #[test]
    fn range_for_small_totals() {
        assert_eq!(page_range(1, 0, 2), vec![Page(1)]);
        assert_eq!(page_range(1, 1, 2), vec![Page(1)]);
        assert_eq!(page_range(2, 3, 2), vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn pager_clamps_navigation() {
        let mut pager = Pager::new(size(10));
        pager.previous();
        assert_eq!(pager.current_page(), 1);
        pager.go_to(9, 3);
        assert_eq!(pager.current_page(), 3);
        pager.next(3);
        assert_eq!(pager.current_page(), 3);
        pager.clamp(2);
        assert_eq!(pager.current_page(), 2);
        pager.set_page_size(size(25));
        assert_eq!(pager.current_page(), 1);
    }
}
