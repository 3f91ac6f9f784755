//! One-shot note reminders.
//!
//! # Responsibility
//! - Define the scheduler contract used by note use-cases.
//! - Deliver fired reminders through the host notification facility.
//!
//! # Invariants
//! - Per reminder: `Unscheduled -> Scheduled -> Fired | Cancelled`; both
//!   end states are terminal.
//! - Scheduling a time that is not strictly in the future registers nothing.
//! - Cancel racing a fire may go either way.
//! - Pending reminders do not survive the process.

pub mod delivery;
pub mod notify;
pub mod picker;
pub mod scheduler;

use crate::model::note::{Note, NoteId};
use serde::{Deserialize, Serialize};

/// Payload of one deferred reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Registration key, used for cancellation.
    pub note_id: NoteId,
    pub title: String,
    pub description: String,
    /// Absolute epoch milliseconds.
    pub fire_at_ms: i64,
}

impl Reminder {
    /// Reminder for `note`, if it carries a reminder time.
    pub fn for_note(note: &Note) -> Option<Self> {
        note.reminder_time.map(|fire_at_ms| Self {
            note_id: note.id,
            title: note.title.clone(),
            description: note.description.clone(),
            fire_at_ms,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    Scheduled,
    /// The requested time was not in the future; nothing was registered.
    SkippedPastDue,
}

/// Deferred one-shot reminder registration.
pub trait ReminderScheduler {
    fn schedule(&self, reminder: Reminder) -> ScheduleOutcome;
    /// Removes the registration for `note_id`; `false` when none existed.
    fn cancel(&self, note_id: NoteId) -> bool;
}

impl<S: ReminderScheduler + ?Sized> ReminderScheduler for std::sync::Arc<S> {
    fn schedule(&self, reminder: Reminder) -> ScheduleOutcome {
        (**self).schedule(reminder)
    }

    fn cancel(&self, note_id: NoteId) -> bool {
        (**self).cancel(note_id)
    }
}

impl<S: ReminderScheduler + ?Sized> ReminderScheduler for &S {
    fn schedule(&self, reminder: Reminder) -> ScheduleOutcome {
        (**self).schedule(reminder)
    }

    fn cancel(&self, note_id: NoteId) -> bool {
        (**self).cancel(note_id)
    }
}
