//! Position bookkeeping for a section's active notes.

use crate::models::{Note, NoteId, NotePatch, Section};

/// Indices into `notes` of the active notes in `section`, in display order.
///
/// Sorting is stable, so equal positions keep fetch order.
pub(crate) fn ordered_indices(notes: &[Note], section: Section) -> Vec<usize> {
    let mut indices: Vec<usize> = notes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.is_active() && n.section == section)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by_key(|&i| notes[i].position);
    indices
}

/// Move the element at `from` to `to`, shifting everything in between by one.
///
/// Returns false (and leaves `items` alone) when the indices are equal or out
/// of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from == to || from >= items.len() || to >= items.len() {
        return false;
    }
    let item = items.remove(from);
    items.insert(to, item);
    true
}

/// A pending position write plus the patch that undoes it
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Write {
    pub id: NoteId,
    pub patch: NotePatch,
    pub undo: NotePatch,
}

/// Assign positions `0..n-1` to `order` (indices into `notes`) and return the
/// writes for the notes whose position changed.
pub(crate) fn assign_positions(notes: &mut [Note], order: &[usize]) -> Vec<Write> {
    let mut writes = Vec::new();
    for (position, &idx) in order.iter().enumerate() {
        let position = position as u32;
        let note = &mut notes[idx];
        if note.position != position {
            let patch = NotePatch::default().position(position);
            writes.push(Write {
                id: note.id,
                undo: note.inverse_of(&patch),
                patch,
            });
            note.position = position;
        }
    }
    writes
}

/// Close the gaps in `section` left by a note that left its ordering.
pub(crate) fn compact(notes: &mut [Note], section: Section) -> Vec<Write> {
    let order = ordered_indices(notes, section);
    assign_positions(notes, &order)
}

/// Apply the drag move and renumber the section. `None` if the move is a
/// no-op.
pub(crate) fn reorder(notes: &mut [Note], section: Section, from: usize, to: usize) -> Option<Vec<Write>> {
    let mut order = ordered_indices(notes, section);
    if !move_item(&mut order, from, to) {
        return None;
    }
    Some(assign_positions(notes, &order))
}
