//! Optimistic single-field updates.
//!
//! An update is applied to the [`RecordStore`] before the backend answers, so
//! the view reflects it immediately. The backend's answer then either
//! confirms the change or rolls the field back to its last confirmed value.
//!
//! Each `(record, field)` pair moves through `Idle → Pending → Confirmed |
//! RolledBack`. At most one update per record may be pending: a second one is
//! rejected, so a slow response can never overwrite a newer optimistic value.
//!
//! The two-phase API ([`MutationCoordinator::begin`] and
//! [`MutationCoordinator::resolve`]) lets an event loop keep working while the
//! remote call is outstanding. [`MutationCoordinator::update_field`] runs both
//! phases around an awaited [`RemoteUpdater`] call.

use std::collections::HashMap;

use tabula_model::{FieldValue, RecordId};
use tracing::{debug, info, warn};

use crate::error::{CoreError, RemoteError, Result};
use crate::remote::{RemoteUpdater, UpdateAck, UpdateRequest};
use crate::store::RecordStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MutationState {
    #[default]
    Idle,
    Pending,
    Confirmed,
    RolledBack,
}

/// Result of a resolved update.
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    Confirmed,
    /// The field was restored to its last confirmed value. The caller may
    /// retry the same update.
    RolledBack { error: RemoteError },
}

impl MutationOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, MutationOutcome::Confirmed)
    }
}

/// Handle for one pending update, returned by [`MutationCoordinator::begin`].
#[derive(Debug, Clone, PartialEq)]
#[must_use = "a pending update must be resolved"]
pub struct MutationTicket {
    request: UpdateRequest,
    field: String,
    sequence: u64,
}

impl MutationTicket {
    pub fn id(&self) -> &RecordId {
        &self.request.id
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    /// Request to hand to the remote updater.
    pub fn request(&self) -> &UpdateRequest {
        &self.request
    }
}

#[derive(Debug)]
struct Pending {
    field: String,
    sequence: u64,
    /// Last confirmed value; `None` when the record had no such field.
    confirmed: Option<FieldValue>,
    optimistic: FieldValue,
}

#[derive(Debug, Default)]
pub struct MutationCoordinator {
    pending: HashMap<RecordId, Pending>,
    states: HashMap<(RecordId, String), MutationState>,
    next_sequence: u64,
}

impl MutationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, id: &RecordId, field: &str) -> MutationState {
        self.states
            .get(&(id.clone(), field.to_string()))
            .copied()
            .unwrap_or_default()
    }

    pub fn is_pending(&self, id: &RecordId) -> bool {
        self.pending.contains_key(id)
    }

    /// Apply `value` optimistically and register the pending update.
    ///
    /// Fails with [`CoreError::NotFound`] (no state change) when `id` is not
    /// in the store, and with [`CoreError::MutationInFlight`] when an earlier
    /// update for `id` is unresolved.
    pub fn begin(
        &mut self,
        store: &mut RecordStore,
        id: &RecordId,
        field: &str,
        value: FieldValue,
    ) -> Result<MutationTicket> {
        if self.pending.contains_key(id) {
            debug!(%id, field, "Rejecting update while another is in flight");
            return Err(CoreError::MutationInFlight(id.clone()));
        }
        let current = store
            .get(id)
            .ok_or_else(|| CoreError::NotFound(id.clone()))?;
        let confirmed = current.try_get(field).cloned();
        let next = current.with_field(field, value.clone());
        store.replace(next)?;

        self.next_sequence += 1;
        let sequence = self.next_sequence;
        self.pending.insert(
            id.clone(),
            Pending {
                field: field.to_string(),
                sequence,
                confirmed,
                optimistic: value.clone(),
            },
        );
        self.states
            .insert((id.clone(), field.to_string()), MutationState::Pending);
        debug!(%id, field, "Applied optimistic update");

        Ok(MutationTicket {
            request: UpdateRequest::single(id.clone(), field, value),
            field: field.to_string(),
            sequence,
        })
    }

    /// Settle a pending update with the backend's answer.
    ///
    /// Returns `None` when the ticket is no longer tracked (the owning view
    /// was torn down); the late answer is then ignored.
    pub fn resolve(
        &mut self,
        store: &mut RecordStore,
        ticket: &MutationTicket,
        answer: std::result::Result<UpdateAck, RemoteError>,
    ) -> Option<MutationOutcome> {
        let id = ticket.id();
        match self.pending.get(id) {
            Some(pending) if pending.sequence == ticket.sequence => {}
            _ => {
                debug!(%id, field = ticket.field(), "Discarding late update result");
                return None;
            }
        }
        let pending = self.pending.remove(id)?;
        let key = (id.clone(), pending.field.clone());

        match answer.and_then(UpdateAck::into_result) {
            Ok(_) => {
                info!(%id, field = %pending.field, "Update confirmed");
                self.states.insert(key, MutationState::Confirmed);
                Some(MutationOutcome::Confirmed)
            }
            Err(error) => {
                warn!(%id, field = %pending.field, %error, "Update failed, rolling back");
                self.rollback(store, id, pending);
                self.states.insert(key, MutationState::RolledBack);
                Some(MutationOutcome::RolledBack { error })
            }
        }
    }

    /// Optimistically apply, call the backend, then confirm or roll back.
    pub async fn update_field<R>(
        &mut self,
        store: &mut RecordStore,
        remote: &R,
        id: &RecordId,
        field: &str,
        value: FieldValue,
    ) -> Result<MutationOutcome>
    where
        R: RemoteUpdater + ?Sized,
    {
        let ticket = self.begin(store, id, field, value)?;
        let answer = remote.update(ticket.request()).await;
        self.resolve(store, &ticket, answer)
            .ok_or_else(|| CoreError::Cancelled(id.clone()))
    }

    /// Forget every pending update and all per-field state; answers that
    /// arrive afterwards are discarded.
    pub fn teardown(&mut self) {
        if !self.pending.is_empty() {
            debug!(pending = self.pending.len(), "Dropping pending updates");
        }
        self.pending.clear();
        self.states.clear();
    }

    /// Drop per-field state of records no longer in `store`.
    pub fn prune(&mut self, store: &RecordStore) {
        self.states.retain(|(id, _), _| store.get(id).is_some());
    }

    fn rollback(&self, store: &mut RecordStore, id: &RecordId, pending: Pending) {
        let Some(current) = store.get(id) else {
            return;
        };
        // A refresh may have replaced the optimistic value already.
        if current.get(&pending.field) != &pending.optimistic {
            return;
        }
        let restored = match pending.confirmed {
            Some(value) => current.with_field(&pending.field, value),
            None => current.without_field(&pending.field),
        };
        // The record was just looked up, so the id is present.
        let _ = store.replace(restored);
    }
}
