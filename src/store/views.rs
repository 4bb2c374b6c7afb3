//! Derived, read-only views over the note list.

use std::cmp::Reverse;

use super::reorder::ordered_indices;
use crate::models::{Note, Section};

/// Active notes of `section`, in display order
pub fn section(notes: &[Note], section: Section) -> Vec<Note> {
    ordered_indices(notes, section)
        .into_iter()
        .map(|i| notes[i].clone())
        .collect()
}

pub fn active_count(notes: &[Note], section: Section) -> usize {
    notes
        .iter()
        .filter(|n| n.is_active() && n.section == section)
        .count()
}

/// Completed notes, most recently completed first. Notes without a
/// completion time sort last.
pub fn completed(notes: &[Note]) -> Vec<Note> {
    let mut done: Vec<Note> = notes.iter().filter(|n| n.completed).cloned().collect();
    done.sort_by_key(|n| (n.completed_at.is_none(), Reverse(n.completed_at)));
    done
}

/// Active notes with a deadline, soonest first
pub fn upcoming_deadlines(notes: &[Note]) -> Vec<Note> {
    let mut due: Vec<Note> = notes
        .iter()
        .filter(|n| n.is_active() && n.deadline.is_some())
        .cloned()
        .collect();
    due.sort_by_key(|n| n.deadline);
    due
}

/// Card background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tint {
    Lime,
    Sky,
    Yellow,
    Red,
}

impl Tint {
    fn for_section(section: Section) -> Self {
        match section {
            Section::Immediate => Self::Lime,
            Section::Todo => Self::Sky,
            Section::Later => Self::Yellow,
        }
    }
}

/// Display model for one note. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteCard {
    pub note: Note,
    /// Section the note was completed from; drives the tint of completed cards
    pub section_before_completed: Option<Section>,
    pub tint: Tint,
}

impl NoteCard {
    pub fn new(note: Note) -> Self {
        let section_before_completed = note.completed.then_some(note.section);
        let tint = if note.completed && note.deadline.is_some() {
            Tint::Red
        } else {
            Tint::for_section(section_before_completed.unwrap_or(note.section))
        };
        Self {
            note,
            section_before_completed,
            tint,
        }
    }
}

/// Every view of the board at once
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Board {
    pub sections: Vec<(Section, Vec<NoteCard>)>,
    pub completed: Vec<NoteCard>,
    pub deadlines: Vec<NoteCard>,
}

impl Board {
    pub fn build(notes: &[Note]) -> Self {
        let cards = |list: Vec<Note>| list.into_iter().map(NoteCard::new).collect::<Vec<_>>();
        Self {
            sections: Section::ALL
                .iter()
                .map(|&s| (s, cards(section(notes, s))))
                .collect(),
            completed: cards(completed(notes)),
            deadlines: cards(upcoming_deadlines(notes)),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.iter().all(|(_, cards)| cards.is_empty()) && self.completed.is_empty()
    }
}
