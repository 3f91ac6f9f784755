//! Note domain model.
//!
//! # Responsibility
//! - Define the persisted note record and its default values.
//! - Provide draft validation and flag transition helpers.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes afterwards.
//! - `title` and `description` are never empty for a persisted note.
//! - `timestamp` is set once at creation; edits and toggles keep it.
//! - Flags are independent; no combination is forbidden.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store-assigned note identifier (SQLite rowid).
pub type NoteId = i64;

/// Opaque ARGB display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteColor(pub u32);

impl NoteColor {
    /// Color preselected by the create dialog.
    pub const DEFAULT: NoteColor = NoteColor(0xFFA5_F3EB);

    /// Fixed palette offered to the user, in display order.
    pub const PALETTE: [NoteColor; 6] = [
        NoteColor(0xFFA5_F3EB),
        NoteColor(0xFFFF_D6E8),
        NoteColor(0xFFFF_F9B0),
        NoteColor(0xFFC1_EFFF),
        NoteColor(0xFFD3_F2D3),
        NoteColor(0xFFB2_EBF2),
    ];

    pub fn argb(self) -> u32 {
        self.0
    }
}

impl Default for NoteColor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Category label from the fixed set offered by the edit dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    General,
    Work,
    Study,
    Personal,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Work,
        Category::Study,
        Category::Personal,
        Category::Other,
    ];

    /// Canonical persisted form.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Work => "work",
            Self::Study => "study",
            Self::Personal => "personal",
            Self::Other => "other",
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Work => "Work",
            Self::Study => "Study",
            Self::Personal => "Personal",
            Self::Other => "Other",
        }
    }

    /// Uzbek label written by earlier app releases.
    pub fn legacy_label(self) -> &'static str {
        match self {
            Self::General => "Umumiy",
            Self::Work => "Ish",
            Self::Study => "O'qish",
            Self::Personal => "Shaxsiy",
            Self::Other => "Boshqalar",
        }
    }

    /// Parses a label case-insensitively. Blank input maps to the default.
    ///
    /// Legacy labels are accepted too; typographic apostrophes in `O'qish`
    /// read the same as the ASCII one.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Some(Self::default());
        }
        let normalized: String = trimmed
            .chars()
            .map(|ch| match ch {
                '\u{2018}' | '\u{2019}' | '\u{02BB}' | '\u{02BC}' | '`' => '\'',
                other => other,
            })
            .collect();
        Self::ALL.into_iter().find(|category| {
            category.as_str().eq_ignore_ascii_case(&normalized)
                || category.legacy_label().eq_ignore_ascii_case(&normalized)
        })
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One of the three independent boolean note flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteFlag {
    Pinned,
    Favorite,
    Archived,
}

impl NoteFlag {
    /// Column backing this flag in the `notes` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Pinned => "isPinned",
            Self::Favorite => "isFavorite",
            Self::Archived => "isArchived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pinned" | "pin" => Some(Self::Pinned),
            "favorite" | "favourite" => Some(Self::Favorite),
            "archived" | "archive" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Validation failures for note writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    EmptyDescription,
    InvalidTimestamp(i64),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::EmptyDescription => write!(f, "description must not be empty"),
            Self::InvalidTimestamp(value) => {
                write!(f, "timestamp {value} is not a representable date")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Values collected by the create/edit dialog.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub description: String,
    pub color: NoteColor,
    /// Absolute epoch milliseconds, `None` when no reminder is set.
    pub reminder_time: Option<i64>,
    pub category: Category,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with surrounding whitespace removed from text fields.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            ..self.clone()
        }
    }

    /// Checks the non-empty text rule on trimmed values.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_text(&self.title, &self.description)
    }
}

/// Persisted note record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub description: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    pub color: NoteColor,
    /// Absolute reminder time, epoch milliseconds.
    pub reminder_time: Option<i64>,
    pub category: Category,
    pub is_pinned: bool,
    pub is_favorite: bool,
    pub is_archived: bool,
}

impl Note {
    /// Placeholder id of a note that has not been inserted yet.
    pub const UNSAVED_ID: NoteId = 0;

    /// Creates an unsaved note with default flags, category and no reminder.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        color: NoteColor,
        timestamp: i64,
    ) -> Self {
        Self {
            id: Self::UNSAVED_ID,
            title: title.into(),
            description: description.into(),
            timestamp,
            color,
            reminder_time: None,
            category: Category::default(),
            is_pinned: false,
            is_favorite: false,
            is_archived: false,
        }
    }

    /// Builds an unsaved note from a dialog draft stamped at `timestamp`.
    pub fn from_draft(draft: &NoteDraft, timestamp: i64) -> Self {
        let draft = draft.normalized();
        Self {
            reminder_time: draft.reminder_time,
            category: draft.category,
            ..Self::new(draft.title, draft.description, draft.color, timestamp)
        }
    }

    /// Returns a copy with the editable fields replaced by `draft`.
    ///
    /// Identity, creation time and flags are kept.
    pub fn apply_draft(&self, draft: &NoteDraft) -> Self {
        let draft = draft.normalized();
        Self {
            title: draft.title,
            description: draft.description,
            color: draft.color,
            reminder_time: draft.reminder_time,
            category: draft.category,
            ..self.clone()
        }
    }

    pub fn is_saved(&self) -> bool {
        self.id != Self::UNSAVED_ID
    }

    pub fn flag(&self, flag: NoteFlag) -> bool {
        match flag {
            NoteFlag::Pinned => self.is_pinned,
            NoteFlag::Favorite => self.is_favorite,
            NoteFlag::Archived => self.is_archived,
        }
    }

    pub fn set_flag(&mut self, flag: NoteFlag, value: bool) {
        match flag {
            NoteFlag::Pinned => self.is_pinned = value,
            NoteFlag::Favorite => self.is_favorite = value,
            NoteFlag::Archived => self.is_archived = value,
        }
    }

    /// Flips one flag and returns its new value.
    pub fn toggle(&mut self, flag: NoteFlag) -> bool {
        let value = !self.flag(flag);
        self.set_flag(flag, value);
        value
    }

    /// Case-insensitive substring match on title or description.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self.description.to_lowercase().contains(&needle)
    }

    /// Plain-text form used when sharing a note.
    pub fn share_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.description)
    }

    /// Validates the write-side invariants.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        validate_text(&self.title, &self.description)?;
        if DateTime::<Utc>::from_timestamp_millis(self.timestamp).is_none() {
            return Err(NoteValidationError::InvalidTimestamp(self.timestamp));
        }
        Ok(())
    }
}

fn validate_text(title: &str, description: &str) -> Result<(), NoteValidationError> {
    if title.trim().is_empty() {
        return Err(NoteValidationError::EmptyTitle);
    }
    if description.trim().is_empty() {
        return Err(NoteValidationError::EmptyDescription);
    }
    Ok(())
}
