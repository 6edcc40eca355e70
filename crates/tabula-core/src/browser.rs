//! One browsing session over a record collection.
//!
//! [`Browser`] owns the store, the query inputs and the pager for a view
//! preset, and keeps the pagination invariants: the current page is always
//! within `[1, total_pages]`, and changing the search term, the filters or the
//! page size returns to page 1. Everything displayed is pulled from
//! [`Browser::view`] and [`Browser::page`] on demand.

use std::num::NonZeroUsize;

use tabula_model::{FieldValue, Filter, Record, RecordId, SearchSpec, SortSpec, ViewPreset};
use tracing::debug;

use crate::error::{CoreError, RemoteError, Result};
use crate::ingest::{IngestReport, coerce, ingest};
use crate::mutation::{MutationCoordinator, MutationOutcome, MutationState, MutationTicket};
use crate::paginate::{self, DEFAULT_PAGE_WINDOW, PageItem, PageSlice, Pager};
use crate::query::{View, derive_view};
use crate::remote::{RecordSource, RemoteUpdater, UpdateAck};
use crate::store::{RecordStore, StoreState, StoreSummary};

#[derive(Debug)]
pub struct Browser {
    preset: ViewPreset,
    store: RecordStore,
    mutations: MutationCoordinator,
    search: SearchSpec,
    filter: Filter,
    sort: Option<SortSpec>,
    pager: Pager,
    page_window: usize,
    last_ingest: Option<IngestReport>,
}

impl Browser {
    pub fn new(preset: ViewPreset) -> Self {
        let search = preset.search();
        let sort = preset.default_sort.clone();
        Self {
            preset,
            store: RecordStore::new(),
            mutations: MutationCoordinator::new(),
            search,
            filter: Filter::new(),
            sort,
            pager: Pager::default(),
            page_window: DEFAULT_PAGE_WINDOW,
            last_ingest: None,
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: NonZeroUsize) -> Self {
        self.pager.set_page_size(page_size);
        self
    }

    #[must_use]
    pub fn with_page_window(mut self, delta: usize) -> Self {
        self.page_window = delta;
        self
    }

    pub fn preset(&self) -> &ViewPreset {
        &self.preset
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn state(&self) -> &StoreState {
        self.store.state()
    }

    pub fn ingest_report(&self) -> Option<&IngestReport> {
        self.last_ingest.as_ref()
    }

    /// Fetch the collection and replace the snapshot.
    ///
    /// On failure the store becomes `Errored`, the view is empty, and the
    /// caller may simply call `load` again.
    pub async fn load<S>(&mut self, source: &S) -> Result<&IngestReport>
    where
        S: RecordSource + ?Sized,
    {
        let ticket = self.store.begin_load();
        match source.fetch().await {
            Ok(items) => {
                let (records, report) = ingest(items, &self.preset.schema);
                self.store.finish_load(ticket, Ok(records));
                self.mutations.prune(&self.store);
                self.reclamp();
                Ok(self.last_ingest.insert(report))
            }
            Err(error) => {
                self.store.finish_load(ticket, Err(error.clone()));
                self.reclamp();
                Err(CoreError::Remote(error))
            }
        }
    }

    /// Replace the snapshot with already validated records.
    pub fn populate(&mut self, records: Vec<Record>) {
        self.store.populate(records);
        self.mutations.prune(&self.store);
        self.reclamp();
    }

    pub fn search_term(&self) -> &str {
        &self.search.term
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search.term = term.into();
        self.pager.reset();
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    /// Set one filter; an empty value removes the constraint.
    pub fn set_filter(&mut self, field: impl Into<String>, expected: impl Into<String>) {
        self.filter.set(field, expected);
        self.pager.reset();
    }

    pub fn set_filters(&mut self, filter: Filter) {
        self.filter = filter;
        self.pager.reset();
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        self.sort = sort;
    }

    /// Column-header click on `field`.
    pub fn toggle_sort(&mut self, field: &str) {
        self.sort = Some(match &self.sort {
            Some(current) => current.toggle(field),
            None => SortSpec::ascending(field),
        });
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn set_page_size(&mut self, page_size: NonZeroUsize) {
        self.pager.set_page_size(page_size);
    }

    pub fn go_to_page(&mut self, page: usize) {
        let total = self.total_pages();
        self.pager.go_to(page, total);
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        self.pager.next(total);
    }

    pub fn previous_page(&mut self) {
        self.pager.previous();
    }

    /// The full searched, filtered and sorted view.
    pub fn view(&self) -> View<'_> {
        derive_view(
            self.store.records(),
            &self.search,
            &self.filter,
            self.sort.as_ref(),
        )
    }

    pub fn total_pages(&self) -> usize {
        paginate::total_pages(self.view().len(), self.pager.page_size())
    }

    pub fn page(&self) -> PageSlice<&Record> {
        let view = self.view();
        paginate::slice(
            view.records(),
            self.pager.page_size(),
            self.pager.current_page(),
        )
    }

    pub fn page_range(&self) -> Vec<PageItem> {
        paginate::page_range(
            self.pager.current_page(),
            self.total_pages(),
            self.page_window,
        )
    }

    pub fn summary(&self) -> StoreSummary {
        self.store.summary(self.preset.status_field.as_deref())
    }

    /// Choices for a filter dropdown.
    ///
    /// Enumerated status fields offer their declared values; other fields
    /// offer the distinct values present in the snapshot.
    pub fn filter_options(&self, field: &str) -> Vec<String> {
        match self.preset.schema.status_values(field) {
            Some(allowed) if !allowed.is_empty() => allowed.to_vec(),
            _ => self.store.distinct_values(field),
        }
    }

    /// Convert operator input for `field` using the view schema.
    pub fn coerce(&self, field: &str, raw: &str) -> FieldValue {
        coerce(&self.preset.schema, field, raw)
    }

    pub fn mutation_state(&self, id: &RecordId, field: &str) -> MutationState {
        self.mutations.state(id, field)
    }

    pub fn begin_update(
        &mut self,
        id: &RecordId,
        field: &str,
        value: FieldValue,
    ) -> Result<MutationTicket> {
        let ticket = self.mutations.begin(&mut self.store, id, field, value)?;
        self.reclamp();
        Ok(ticket)
    }

    pub fn resolve_update(
        &mut self,
        ticket: &MutationTicket,
        answer: std::result::Result<UpdateAck, RemoteError>,
    ) -> Option<MutationOutcome> {
        let outcome = self.mutations.resolve(&mut self.store, ticket, answer);
        self.reclamp();
        outcome
    }

    pub async fn update_field<R>(
        &mut self,
        remote: &R,
        id: &RecordId,
        field: &str,
        value: FieldValue,
    ) -> Result<MutationOutcome>
    where
        R: RemoteUpdater + ?Sized,
    {
        let outcome = self
            .mutations
            .update_field(&mut self.store, remote, id, field, value)
            .await;
        self.reclamp();
        outcome
    }

    /// The owning screen went away: late fetch and update answers become
    /// no-ops.
    pub fn teardown(&mut self) {
        debug!(view = %self.preset.kind, "Tearing down browser");
        self.store.teardown();
        self.mutations.teardown();
    }

    fn reclamp(&mut self) {
        let total = self.total_pages();
        self.pager.clamp(total);
    }
}
