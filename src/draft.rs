//! Draft/save editing sessions.
//!
//! An [`EditSession`] holds a private working copy (the draft) of one content
//! aggregate. Edits only ever touch the draft; the persistence backend is
//! written exclusively by a successful save, which always sends the whole
//! draft snapshot.
//!
//! State transitions:
//!
//! ```text
//! Uninitialized --load--> Clean --mutate--> Dirty --begin_save--> Saving
//!                           ^                 ^                     |
//!                           +---- success ----+------ failure ------+
//! ```
//!
//! Any state returns to `Uninitialized` on [`EditSession::discard`].

use std::fmt;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::store::{StoreError, StoreResult};

/// Result type for editing session operations
pub type DraftResult<T> = Result<T, DraftError>;

/// Editing session errors
#[derive(Debug, Error)]
pub enum DraftError {
    #[error("No content loaded in this session")]
    NotLoaded,

    #[error("No unsaved changes to save")]
    NothingToSave,

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error("Save ticket does not match the current session")]
    StaleTicket,

    #[error("Failed to persist draft: {0}")]
    Persistence(#[from] StoreError),
}

/// Identifier of one editing session.
///
/// Generated once when the session starts and passed explicitly to anything
/// that needs to correlate work with the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generates a fresh random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0.simple())
    }
}

/// Content aggregate that can be edited through a session.
pub trait Editable: Clone {
    /// Typed single field change.
    type Edit;

    /// Applies one edit in place.
    fn apply(&mut self, edit: Self::Edit);
}

/// Persistence collaborator for whole aggregate snapshots.
pub trait Persist<T> {
    /// Writes the full snapshot, replacing whatever is stored.
    ///
    /// `previous` is the last snapshot this session saved or loaded, if any,
    /// so backends can drop state keyed by values that changed.
    fn persist(&self, snapshot: &T, previous: Option<&T>) -> StoreResult<()>;
}

/// Lifecycle state of an editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditState {
    Uninitialized,
    Clean,
    Dirty,
    Saving,
}

impl fmt::Display for EditState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EditState::Uninitialized => "uninitialized",
            EditState::Clean => "clean",
            EditState::Dirty => "dirty",
            EditState::Saving => "saving",
        };
        f.write_str(name)
    }
}

/// Snapshot handed out by [`EditSession::begin_save`].
///
/// Carries the draft exactly as it was when the save started. Only the
/// session and generation that issued it can complete it.
#[derive(Debug, Clone)]
pub struct SaveTicket<T> {
    session: SessionId,
    generation: u64,
    snapshot: T,
}

impl<T> SaveTicket<T> {
    /// Draft snapshot to send to the persistence backend.
    pub fn snapshot(&self) -> &T {
        &self.snapshot
    }
}

/// Editing session over one content aggregate.
#[derive(Debug)]
pub struct EditSession<T: Editable> {
    id: SessionId,
    state: EditState,
    draft: Option<T>,
    last_saved: Option<T>,
    generation: u64,
    edited_while_saving: bool,
}

impl<T: Editable> EditSession<T> {
    /// Starts an empty session in the `Uninitialized` state.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            state: EditState::Uninitialized,
            draft: None,
            last_saved: None,
            generation: 0,
            edited_while_saving: false,
        }
    }

    pub fn session_id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> EditState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, EditState::Dirty)
            || (self.state == EditState::Saving && self.edited_while_saving)
    }

    /// Current working copy including unsaved edits.
    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    /// Snapshot last loaded from or confirmed by the persistence backend.
    pub fn last_saved(&self) -> Option<&T> {
        self.last_saved.as_ref()
    }

    /// Loads persisted content, replacing any existing draft.
    ///
    /// Both the draft and the last saved snapshot become deep copies of
    /// `source`, and the session becomes `Clean`.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::SaveInProgress`] while a save is in flight
    pub fn load(&mut self, source: &T) -> DraftResult<()> {
        self.ensure_not_saving()?;

        self.draft = Some(source.clone());
        self.last_saved = Some(source.clone());
        self.next_generation(EditState::Clean);
        debug!(session = %self.id, "draft loaded");
        Ok(())
    }

    /// Replaces the whole draft with an externally supplied snapshot.
    ///
    /// The import is never considered persisted: the session becomes
    /// `Dirty` and requires an explicit save.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::SaveInProgress`] while a save is in flight
    pub fn import(&mut self, snapshot: T) -> DraftResult<()> {
        self.ensure_not_saving()?;

        self.draft = Some(snapshot);
        self.next_generation(EditState::Dirty);
        debug!(session = %self.id, "draft imported");
        Ok(())
    }

    /// Applies one typed edit to the draft.
    ///
    /// Always marks the session dirty, even if the value did not change.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NotLoaded`] before anything was loaded
    pub fn mutate(&mut self, edit: T::Edit) -> DraftResult<()> {
        self.mutate_with(|draft| draft.apply(edit))
    }

    /// Applies an arbitrary change to the draft.
    ///
    /// Edits made while a save is in flight stay in the draft and keep the
    /// session dirty once that save completes; the saved snapshot is not
    /// affected by them.
    ///
    /// # Errors
    ///
    /// Returns [`DraftError::NotLoaded`] before anything was loaded
    pub fn mutate_with(&mut self, edit: impl FnOnce(&mut T)) -> DraftResult<()> {
        let draft = self.draft.as_mut().ok_or(DraftError::NotLoaded)?;
        edit(draft);

        match self.state {
            EditState::Saving => self.edited_while_saving = true,
            _ => self.state = EditState::Dirty,
        }
        Ok(())
    }

    /// Starts a save by snapshotting the draft.
    ///
    /// # Returns
    ///
    /// Ticket holding the snapshot to persist; pass it back to
    /// [`EditSession::finish_save`] with the backend outcome
    ///
    /// # Errors
    ///
    /// - [`DraftError::SaveInProgress`] if a save is already in flight
    /// - [`DraftError::NothingToSave`] if the session is clean
    /// - [`DraftError::NotLoaded`] before anything was loaded
    pub fn begin_save(&mut self) -> DraftResult<SaveTicket<T>> {
        match self.state {
            EditState::Dirty => {}
            EditState::Saving => return Err(DraftError::SaveInProgress),
            EditState::Clean => return Err(DraftError::NothingToSave),
            EditState::Uninitialized => return Err(DraftError::NotLoaded),
        }

        let snapshot = self.draft.clone().ok_or(DraftError::NotLoaded)?;
        self.state = EditState::Saving;
        self.edited_while_saving = false;
        debug!(session = %self.id, "save started");

        Ok(SaveTicket {
            session: self.id,
            generation: self.generation,
            snapshot,
        })
    }

    /// Completes a save with the persistence backend outcome.
    ///
    /// On success the ticket snapshot becomes the last saved snapshot. On
    /// failure nothing but the state changes, so the user can retry without
    /// re-entering edits.
    ///
    /// # Errors
    ///
    /// - [`DraftError::StaleTicket`] if the ticket was issued by another
    ///   session, or before a discard
    /// - [`DraftError::Persistence`] carrying the backend failure
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket<T>,
        outcome: StoreResult<()>,
    ) -> DraftResult<()> {
        if ticket.session != self.id
            || ticket.generation != self.generation
            || self.state != EditState::Saving
        {
            return Err(DraftError::StaleTicket);
        }

        match outcome {
            Ok(()) => {
                self.last_saved = Some(ticket.snapshot);
                self.state = if self.edited_while_saving {
                    EditState::Dirty
                } else {
                    EditState::Clean
                };
                self.edited_while_saving = false;
                info!(session = %self.id, state = %self.state, "draft saved");
                Ok(())
            }
            Err(err) => {
                self.state = EditState::Dirty;
                self.edited_while_saving = false;
                warn!(session = %self.id, error = %err, "draft save failed");
                Err(DraftError::Persistence(err))
            }
        }
    }

    /// Saves the whole draft through the persistence backend.
    ///
    /// # Errors
    ///
    /// Same as [`EditSession::begin_save`] and [`EditSession::finish_save`]
    pub fn save<P>(&mut self, backend: &P) -> DraftResult<()>
    where
        P: Persist<T> + ?Sized,
    {
        let ticket = self.begin_save()?;
        let outcome = backend.persist(ticket.snapshot(), self.last_saved.as_ref());
        self.finish_save(ticket, outcome)
    }

    /// Abandons the draft without persisting it.
    pub fn discard(&mut self) {
        self.draft = None;
        self.last_saved = None;
        self.next_generation(EditState::Uninitialized);
        debug!(session = %self.id, "draft discarded");
    }

    fn ensure_not_saving(&self) -> DraftResult<()> {
        if self.state == EditState::Saving {
            return Err(DraftError::SaveInProgress);
        }
        Ok(())
    }

    fn next_generation(&mut self, state: EditState) {
        self.generation += 1;
        self.state = state;
        self.edited_while_saving = false;
    }
}
