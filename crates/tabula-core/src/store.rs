//! Authoritative in-memory snapshot of one record collection.
//!
//! The store is a small state machine: `Loading → Populated | Errored`. A
//! populated store can be refreshed (replaced by a newer snapshot) or fail,
//! and single records can be swapped by id. Loads are generation-stamped so a
//! response that arrives after a newer load started, or after the owning
//! view was torn down, is dropped instead of applied.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tabula_model::{Record, RecordId};
use tracing::{debug, info, warn};

use crate::error::{CoreError, RemoteError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreState {
    Loading,
    Populated,
    Errored(RemoteError),
}

/// Handle for one outstanding fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a load ticket must be passed back to finish_load"]
pub struct LoadTicket {
    generation: u64,
}

/// Header counts for a collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSummary {
    pub total: usize,
    /// Records per status value; records without a status are not counted.
    pub by_status: BTreeMap<String, usize>,
}

impl StoreSummary {
    pub fn count(&self, status: &str) -> usize {
        self.by_status.get(status).copied().unwrap_or(0)
    }
}

#[derive(Debug)]
pub struct RecordStore {
    state: StoreState,
    records: Vec<Record>,
    index: HashMap<RecordId, usize>,
    generation: u64,
    torn_down: bool,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        Self {
            state: StoreState::Loading,
            records: Vec::new(),
            index: HashMap::new(),
            generation: 0,
            torn_down: false,
        }
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn is_populated(&self) -> bool {
        self.state == StoreState::Populated
    }

    /// Current snapshot. Empty unless the store is populated.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.index.get(id).map(|&position| &self.records[position])
    }

    /// Start a fetch. Any earlier outstanding ticket becomes stale.
    ///
    /// A populated store keeps serving its snapshot while the refresh is in
    /// flight; otherwise the store reports `Loading`.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        if !self.is_populated() {
            self.state = StoreState::Loading;
        }
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of a fetch. Returns `false` when the result was stale
    /// and discarded.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<Vec<Record>, RemoteError>,
    ) -> bool {
        if self.torn_down || ticket.generation != self.generation {
            debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Discarding stale load result"
            );
            return false;
        }
        match result {
            Ok(records) => {
                info!(records = records.len(), "Record store populated");
                self.index = index_records(&records);
                self.records = records;
                self.state = StoreState::Populated;
            }
            Err(error) => {
                warn!(%error, "Record fetch failed");
                self.records.clear();
                self.index.clear();
                self.state = StoreState::Errored(error);
            }
        }
        true
    }

    /// Load a snapshot synchronously.
    pub fn populate(&mut self, records: Vec<Record>) {
        let ticket = self.begin_load();
        self.finish_load(ticket, Ok(records));
    }

    /// Swap exactly one record, matched by id. Returns the record it replaced.
    pub fn replace(&mut self, record: Record) -> Result<Record> {
        let Some(&position) = self.index.get(record.id()) else {
            return Err(CoreError::NotFound(record.id().clone()));
        };
        Ok(std::mem::replace(&mut self.records[position], record))
    }

    /// Stop accepting results for anything still outstanding.
    pub fn teardown(&mut self) {
        self.torn_down = true;
    }

    pub fn summary(&self, status_field: Option<&str>) -> StoreSummary {
        let mut summary = StoreSummary {
            total: self.records.len(),
            by_status: BTreeMap::new(),
        };
        if let Some(field) = status_field {
            for record in &self.records {
                if let Some(status) = record.get(field).as_text() {
                    *summary.by_status.entry(status.to_string()).or_default() += 1;
                }
            }
        }
        summary
    }

    /// Sorted unique display values of `field`, for filter option lists.
    pub fn distinct_values(&self, field: &str) -> Vec<String> {
        self.records
            .iter()
            .map(|record| record.get(field).display_text().into_owned())
            .filter(|value| !value.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

fn index_records(records: &[Record]) -> HashMap<RecordId, usize> {
    records
        .iter()
        .enumerate()
        .map(|(position, record)| (record.id().clone(), position))
        .collect()
}
