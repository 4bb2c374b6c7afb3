use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::remote::RecordId;

pub type NoteId = RecordId;

/// Longest title accepted by the stores, in characters.
pub const MAX_TITLE_LEN: usize = 2000;

/// Bucket an active note is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Immediate,
    #[default]
    Todo,
    Later,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Immediate, Section::Todo, Section::Later];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Immediate => "immediate",
            Self::Todo => "todo",
            Self::Later => "later",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "immediate" | "now" => Some(Self::Immediate),
            "todo" | "to-do" => Some(Self::Todo),
            "later" => Some(Self::Later),
            _ => None,
        }
    }

    /// Heading shown above the section
    pub fn label(&self) -> &'static str {
        match self {
            Self::Immediate => "Immediate",
            Self::Todo => "To-Do",
            Self::Later => "Will Get Around To It",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Immediate => 0,
            Self::Todo => 1,
            Self::Later => 2,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!("unknown section '{}' (expected immediate, todo or later)", s)
        })
    }
}

/// A note as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub section: Section,
    /// Rank within the section; only meaningful while not completed
    #[serde(default)]
    pub position: u32,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub deadline: Option<DateTime<Utc>>,
}

impl Note {
    pub fn new(id: NoteId, title: impl Into<String>, section: Section) -> Self {
        Self {
            id,
            title: title.into(),
            section,
            position: 0,
            completed: false,
            completed_at: None,
            deadline: None,
        }
    }

    /// Still part of its section's ordering
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Merge the fields present in `patch`
    pub fn apply(&mut self, patch: &NotePatch) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(section) = patch.section {
            self.section = section;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
    }

    /// Patch that restores the current values of every field `patch` touches.
    pub fn inverse_of(&self, patch: &NotePatch) -> NotePatch {
        NotePatch {
            title: patch.title.as_ref().map(|_| self.title.clone()),
            section: patch.section.map(|_| self.section),
            position: patch.position.map(|_| self.position),
            completed: patch.completed.map(|_| self.completed),
            completed_at: patch.completed_at.map(|_| self.completed_at),
            deadline: patch.deadline.map(|_| self.deadline),
        }
    }
}

/// Title acceptable for a note
pub fn is_valid_title(title: &str) -> bool {
    !title.trim().is_empty() && title.chars().count() <= MAX_TITLE_LEN
}

/// Body of a create request
#[derive(Debug, Clone, Serialize)]
pub struct NewNote<'a> {
    pub title: &'a str,
    pub section: Section,
    pub deadline: Option<DateTime<Utc>>,
    pub position: u32,
}

/// Partial update; absent fields are left untouched remotely.
///
/// Nullable fields use a nested `Option`: `Some(None)` is sent as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<Section>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Option<DateTime<Utc>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<Option<DateTime<Utc>>>,
}

impl NotePatch {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn section(mut self, section: Section) -> Self {
        self.section = Some(section);
        self
    }

    pub fn position(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }

    pub fn deadline(mut self, deadline: Option<DateTime<Utc>>) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn completion(mut self, completed: bool, completed_at: Option<DateTime<Utc>>) -> Self {
        self.completed = Some(completed);
        self.completed_at = Some(completed_at);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
