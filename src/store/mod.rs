//! Note Store
//!
//! Holds the session's notes, derives the per-section views, and applies
//! every mutation locally before persisting it through the remote.
//!
//! When a remote write fails, the store re-applies the inverse patches it
//! recorded before mutating, then re-fetches the whole collection. If the
//! re-fetch fails as well the rolled-back state is kept. Either way the
//! original error is returned.

mod lanes;
mod reorder;
mod views;

pub use reorder::move_item;
pub use views::{Board, NoteCard, Tint};

use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{NotelyError, Result};
use crate::models::{is_valid_title, NewNote, Note, NoteId, NotePatch, Section};
use crate::remote::{Collection, Remote, Resource};
use lanes::{LaneGuard, SectionLanes};
use reorder::Write;

/// Where a drag gesture ended, as reported by the UI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragOutcome {
    pub section: Section,
    pub source: usize,
    /// `None` when the note was dropped outside any list
    pub destination: Option<usize>,
}

/// Cheap to clone; clones share state.
#[derive(Clone)]
pub struct NoteStore {
    notes: Arc<RwLock<Vec<Note>>>,
    resource: Resource<Note>,
    lanes: Arc<SectionLanes>,
}

fn not_found(id: NoteId) -> NotelyError {
    NotelyError::NotFound {
        collection: Collection::Notes,
        id,
    }
}

fn index_of(notes: &[Note], id: NoteId) -> Option<usize> {
    notes.iter().position(|n| n.id == id)
}

impl NoteStore {
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self {
            notes: Arc::new(RwLock::new(Vec::new())),
            resource: Resource::new(remote, Collection::Notes),
            lanes: Arc::new(SectionLanes::default()),
        }
    }

    // Guards must never be held across an `.await`.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Note>> {
        self.notes.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Note>> {
        self.notes.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace local state with the remote collection.
    ///
    /// Waits for every section's lane so no in-flight position writes are
    /// overwritten. On failure the current notes are kept.
    pub async fn load(&self) -> Result<usize> {
        let _lanes = self.lanes.lock_all().await;
        let notes = self.resource.list().await?;
        let count = notes.len();
        *self.write() = notes;
        tracing::debug!(count, "notes loaded");
        Ok(count)
    }

    // ========================
    // Views
    // ========================

    /// Every note, in fetch order
    pub fn notes(&self) -> Vec<Note> {
        self.read().clone()
    }

    pub fn get(&self, id: NoteId) -> Option<Note> {
        self.read().iter().find(|n| n.id == id).cloned()
    }

    /// Active notes of `section` in display order
    pub fn section(&self, section: Section) -> Vec<Note> {
        views::section(&self.read(), section)
    }

    pub fn completed(&self) -> Vec<Note> {
        views::completed(&self.read())
    }

    pub fn upcoming_deadlines(&self) -> Vec<Note> {
        views::upcoming_deadlines(&self.read())
    }

    pub fn board(&self) -> Board {
        Board::build(&self.read())
    }

    // ========================
    // Mutations
    // ========================

    /// Create a note at the end of `section`.
    ///
    /// Blank or over-long titles are rejected with `Ok(None)`.
    pub async fn create(
        &self,
        title: &str,
        section: Section,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Option<Note>> {
        if !is_valid_title(title) {
            tracing::debug!(len = title.chars().count(), "rejected note title");
            return Ok(None);
        }

        let created = self.create_in_lane(title, section, deadline).await;
        self.recover("create", created).await.map(Some)
    }

    async fn create_in_lane(
        &self,
        title: &str,
        section: Section,
        deadline: Option<DateTime<Utc>>,
    ) -> Result<Note> {
        let _lane = self.lanes.lock(section).await;
        let position = views::active_count(&self.read(), section) as u32;
        let new_note = NewNote {
            title,
            section,
            deadline,
            position,
        };

        let note = self.resource.create(&new_note).await?;
        self.write().push(note.clone());
        tracing::info!(id = note.id, %section, position, "note created");
        Ok(note)
    }

    /// Merge `patch` into a note and persist it.
    ///
    /// An invalid title in the patch is dropped and the old title kept. Moving
    /// an active note to another section re-indexes the section it left, and
    /// appends it to the new one unless the patch also sets a position.
    pub async fn update(&self, id: NoteId, mut patch: NotePatch) -> Result<Note> {
        if patch.title.as_deref().map_or(false, |t| !is_valid_title(t)) {
            tracing::debug!(id, "dropping invalid title from update");
            patch.title = None;
        }
        if self.get(id).is_none() {
            return Err(not_found(id));
        }

        let updated = self.update_in_lanes(id, patch).await;
        self.recover("update", updated).await
    }

    async fn update_in_lanes(&self, id: NoteId, mut patch: NotePatch) -> Result<Note> {
        let (_lane, current) = self.lock_note(id, patch.section).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        let writes = {
            let mut notes = self.write();
            let idx = index_of(&notes, id).ok_or_else(|| not_found(id))?;
            let from = notes[idx].section;
            let moving_to = patch
                .section
                .filter(|&to| to != from && notes[idx].is_active());

            if let (Some(to), None) = (moving_to, patch.position) {
                patch.position = Some(views::active_count(&notes, to) as u32);
            }

            let mut writes = vec![Write {
                id,
                undo: notes[idx].inverse_of(&patch),
                patch: patch.clone(),
            }];
            notes[idx].apply(&patch);

            if moving_to.is_some() {
                writes.extend(reorder::compact(&mut notes, from));
            }
            writes
        };

        self.commit("update", &writes).await?;
        tracing::info!(id, "note updated");
        self.get(id).ok_or_else(|| not_found(id))
    }

    /// Delete a note. Unknown ids are a no-op returning `Ok(false)`.
    ///
    /// The local record is kept until the remote confirms the delete. Once it
    /// has, the delete counts as done even if re-indexing the section fails;
    /// that failure is logged and the notes re-fetched.
    pub async fn delete(&self, id: NoteId) -> Result<bool> {
        let deleted = self.delete_in_lane(id).await;
        match deleted {
            Ok(Deletion::Absent) => Ok(false),
            Ok(Deletion::Done) => Ok(true),
            Ok(Deletion::CompactionFailed(e)) => {
                tracing::warn!(id, error = %e, "note deleted but section re-index failed");
                self.reconcile("delete", &e).await;
                Ok(true)
            }
            Err(e) => {
                self.reconcile("delete", &e).await;
                Err(e)
            }
        }
    }

    async fn delete_in_lane(&self, id: NoteId) -> Result<Deletion> {
        let (_lane, note) = match self.lock_note(id, None).await {
            Ok(held) => held,
            Err(e) if e.is_not_found() => return Ok(Deletion::Absent),
            Err(e) => return Err(e),
        };

        match self.resource.delete(id).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => tracing::debug!(id, "note already deleted remotely"),
            Err(e) => return Err(e),
        }

        let writes = {
            let mut notes = self.write();
            notes.retain(|n| n.id != id);
            if note.is_active() {
                reorder::compact(&mut notes, note.section)
            } else {
                Vec::new()
            }
        };
        tracing::info!(id, "note deleted");

        match self.commit("delete", &writes).await {
            Ok(()) => Ok(Deletion::Done),
            Err(e) => Ok(Deletion::CompactionFailed(e)),
        }
    }

    /// Flip completion.
    ///
    /// Completing stamps `completed_at` and closes the gap in the section;
    /// un-completing clears it and appends the note to its section.
    pub async fn toggle_complete(&self, id: NoteId) -> Result<Note> {
        if self.get(id).is_none() {
            return Err(not_found(id));
        }

        let toggled = self.toggle_in_lane(id).await;
        self.recover("toggle_complete", toggled).await
    }

    async fn toggle_in_lane(&self, id: NoteId) -> Result<Note> {
        let (_lane, _) = self.lock_note(id, None).await?;

        let writes = {
            let mut notes = self.write();
            let idx = index_of(&notes, id).ok_or_else(|| not_found(id))?;
            let section = notes[idx].section;
            let completing = !notes[idx].completed;

            let patch = if completing {
                NotePatch::default().completion(true, Some(Utc::now()))
            } else {
                let position = views::active_count(&notes, section) as u32;
                NotePatch::default().completion(false, None).position(position)
            };

            let mut writes = vec![Write {
                id,
                undo: notes[idx].inverse_of(&patch),
                patch: patch.clone(),
            }];
            notes[idx].apply(&patch);

            if completing {
                writes.extend(reorder::compact(&mut notes, section));
            }
            writes
        };

        self.commit("toggle_complete", &writes).await?;
        let note = self.get(id).ok_or_else(|| not_found(id))?;
        tracing::info!(id, completed = note.completed, "completion toggled");
        Ok(note)
    }

    /// Move the active note at index `from` of `section` to index `to` and
    /// renumber the section.
    ///
    /// Returns `Ok(false)` without touching anything when the indices are
    /// equal or out of range.
    pub async fn reorder(&self, section: Section, from: usize, to: usize) -> Result<bool> {
        if from == to {
            return Ok(false);
        }

        let reordered = self.reorder_in_lane(section, from, to).await;
        self.recover("reorder", reordered).await
    }

    async fn reorder_in_lane(&self, section: Section, from: usize, to: usize) -> Result<bool> {
        let _lane = self.lanes.lock(section).await;
        let planned = {
            let mut notes = self.write();
            reorder::reorder(&mut notes, section, from, to)
        };
        let Some(writes) = planned else {
            tracing::debug!(%section, from, to, "reorder indices out of range");
            return Ok(false);
        };

        self.commit("reorder", &writes).await?;
        tracing::info!(%section, from, to, moved = writes.len(), "section reordered");
        Ok(true)
    }

    /// Apply a finished drag. A drop outside any list changes nothing.
    pub async fn handle_drop(&self, drag: DragOutcome) -> Result<bool> {
        match drag.destination {
            Some(destination) => self.reorder(drag.section, drag.source, destination).await,
            None => Ok(false),
        }
    }

    // ========================
    // Internals
    // ========================

    /// Take the lane of the note's section (and `target`, if given). Retries
    /// if the note changed section while we waited.
    async fn lock_note(&self, id: NoteId, target: Option<Section>) -> Result<(LaneGuard<'_>, Note)> {
        loop {
            let seen = self.get(id).ok_or_else(|| not_found(id))?;
            let guard = self
                .lanes
                .lock_pair(seen.section, target.unwrap_or(seen.section))
                .await;
            match self.get(id) {
                Some(note) if note.section == seen.section => return Ok((guard, note)),
                Some(_) => continue,
                None => return Err(not_found(id)),
            }
        }
    }

    /// Issue every write concurrently and wait for all of them. On failure
    /// the local changes are undone and the first error returned; the caller
    /// re-fetches once its lanes are released.
    async fn commit(&self, operation: &'static str, writes: &[Write]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }

        let results = join_all(
            writes
                .iter()
                .map(|w| self.resource.update(w.id, &w.patch)),
        )
        .await;

        let mut failures: Vec<NotelyError> = results.into_iter().filter_map(|r| r.err()).collect();
        if failures.is_empty() {
            return Ok(());
        }

        tracing::warn!(
            operation,
            failed = failures.len(),
            total = writes.len(),
            "remote write failed, rolling back"
        );
        self.rollback(writes);
        Err(failures.swap_remove(0))
    }

    fn rollback(&self, writes: &[Write]) {
        let mut notes = self.write();
        for write in writes.iter().rev() {
            if let Some(note) = notes.iter_mut().find(|n| n.id == write.id) {
                note.apply(&write.undo);
            }
        }
    }

    /// Re-fetch if `result` failed, then pass it through. Must be called with
    /// no lane held.
    async fn recover<T>(&self, operation: &'static str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.reconcile(operation, e).await;
        }
        result
    }

    /// Re-fetch after a failed mutation.
    async fn reconcile(&self, operation: &'static str, cause: &NotelyError) {
        match self.load().await {
            Ok(count) => tracing::info!(operation, count, cause = %cause, "resynchronised notes"),
            Err(e) => tracing::warn!(
                operation,
                cause = %cause,
                error = %e,
                "re-fetch failed, keeping local state"
            ),
        }
    }
}

/// How far a delete got
enum Deletion {
    Absent,
    Done,
    /// Remote delete confirmed; a position write afterwards failed
    CompactionFailed(NotelyError),
}
