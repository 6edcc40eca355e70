//! Pure view derivation: search, then filters, then sort.
//!
//! `derive_view` is pull-based and has no state of its own. The whole view is
//! recomputed on every input change; collections are one fetched page of
//! business records, so an O(n log n) pass per keystroke is fine.

use std::cmp::Ordering;

use tabula_model::{Filter, Record, RecordId, SearchSpec, SortDirection, SortSpec};

/// Ordered result of a query over a snapshot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View<'a> {
    records: Vec<&'a Record>,
}

impl<'a> View<'a> {
    pub fn records(&self) -> &[&'a Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn ids(&self) -> Vec<&'a RecordId> {
        self.records.iter().map(|record| record.id()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + '_ {
        self.records.iter().copied()
    }
}

impl<'a> IntoIterator for View<'a> {
    type Item = &'a Record;
    type IntoIter = std::vec::IntoIter<&'a Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

/// Derive the view for `records`.
///
/// Missing or malformed fields never fail the derivation: they match no
/// non-empty filter and sort as the minimal value.
pub fn derive_view<'a>(
    records: &'a [Record],
    search: &SearchSpec,
    filter: &Filter,
    sort: Option<&SortSpec>,
) -> View<'a> {
    let needle = search.term.to_lowercase();
    let mut selected: Vec<&Record> = records
        .iter()
        .filter(|record| matches_search(record, &needle, &search.fields))
        .filter(|record| matches_filter(record, filter))
        .collect();
    if let Some(sort) = sort {
        sort_records(&mut selected, sort);
    }
    View { records: selected }
}

/// Stable sort by a single key. Equal keys keep their prior relative order.
pub fn sort_records(records: &mut [&Record], sort: &SortSpec) {
    records.sort_by(|a, b| compare(a, b, sort));
}

fn compare(a: &Record, b: &Record, sort: &SortSpec) -> Ordering {
    let ordering = a
        .get(&sort.field)
        .sort_key()
        .compare(&b.get(&sort.field).sort_key());
    match sort.direction {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn matches_search(record: &Record, needle: &str, fields: &[String]) -> bool {
    if needle.is_empty() {
        return true;
    }
    fields.iter().any(|field| {
        record
            .get(field)
            .as_text()
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}

fn matches_filter(record: &Record, filter: &Filter) -> bool {
    filter
        .active()
        .all(|(field, expected)| record.get(field).matches(expected))
}
