//! Browser core: record store, view derivation, pagination and optimistic
//! mutation.
//!
//! Data flows `RecordStore → derive_view → paginate` for display, while the
//! [`MutationCoordinator`] writes single-field changes back into the store.
//! Exports consume the full view from [`derive_view`] directly.

pub mod browser;
pub mod error;
pub mod ingest;
pub mod mutation;
pub mod paginate;
pub mod query;
pub mod remote;
pub mod store;

pub use browser::Browser;
pub use error::{CoreError, RemoteError, Result};
pub use ingest::{IngestIssue, IngestReport, IssueKind, coerce, ingest, parse_timestamp};
pub use mutation::{MutationCoordinator, MutationOutcome, MutationState, MutationTicket};
pub use paginate::{PageItem, PageSlice, Pager, Showing, page_range, slice, total_pages};
pub use query::{View, derive_view, sort_records};
pub use remote::{RecordSource, RemoteUpdater, UpdateAck, UpdateRequest, unwrap_collection};
pub use store::{LoadTicket, RecordStore, StoreState, StoreSummary};
