//! Error types for the browser core.

use tabula_model::RecordId;
use thiserror::Error;

/// Failure reported by a remote collaborator (collection fetch or field update).
///
/// Every variant is recoverable: the caller may retry the same call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RemoteError {
    /// The request never produced a usable response.
    #[error("network failure: {0}")]
    Network(String),

    /// The backend answered but refused the change.
    #[error("update rejected: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),

    /// The response body did not have the expected shape.
    #[error("unexpected payload: {0}")]
    Payload(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Mutation target is not in the current snapshot. No state changed.
    #[error("record {0} not found")]
    NotFound(RecordId),

    /// Another mutation for the same record has not been resolved yet.
    #[error("an update for record {0} is already in flight")]
    MutationInFlight(RecordId),

    /// The owning view was torn down before the mutation resolved.
    #[error("update for record {0} was cancelled")]
    Cancelled(RecordId),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
