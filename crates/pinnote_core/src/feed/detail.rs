//! Read-only projection backing the note detail screen.

use crate::model::note::{Category, Note, NoteColor};
use chrono::{DateTime, TimeZone, Utc};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Background used when a note carries no color.
pub const FALLBACK_BACKGROUND: NoteColor = NoteColor(0xFFCC_CCCC);

const NO_REMINDER_LABEL: &str = "No reminder set";

/// Detail view construction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailError {
    /// The caller opened a detail view without passing a note.
    MissingNote,
}

impl Display for DetailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingNote => write!(f, "note argument is missing"),
        }
    }
}

impl Error for DetailError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDetail {
    note: Note,
}

impl NoteDetail {
    /// Builds the projection; a detail view cannot exist without its note.
    pub fn try_new(note: Option<&Note>) -> Result<Self, DetailError> {
        note.cloned()
            .map(|note| Self { note })
            .ok_or(DetailError::MissingNote)
    }

    pub fn note(&self) -> &Note {
        &self.note
    }

    pub fn category_label(&self) -> String {
        category_line(self.note.category)
    }

    /// `Reminder: HH:mm` in `tz`, or a fixed label when none is set.
    pub fn reminder_label<Tz>(&self, tz: &Tz) -> String
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        self.note
            .reminder_time
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .map(|at| format!("Reminder: {}", at.with_timezone(tz).format("%H:%M")))
            .unwrap_or_else(|| NO_REMINDER_LABEL.to_string())
    }

    pub fn background(&self) -> NoteColor {
        if self.note.color.argb() == 0 {
            FALLBACK_BACKGROUND
        } else {
            self.note.color
        }
    }

    pub fn share_text(&self) -> String {
        self.note.share_text()
    }
}

fn category_line(category: Category) -> String {
    format!("Category: {}", category.label())
}
