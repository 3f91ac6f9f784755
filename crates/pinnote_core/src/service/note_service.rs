//! Note use-case service.
//!
//! # Responsibility
//! - Serve the create/edit dialog: validate, write, (re)schedule reminders.
//! - Serve the list screens: flag toggles, deletes and grouped feeds.
//!
//! # Invariants
//! - Invalid drafts never reach the store.
//! - Every mutation is one store call; reminder bookkeeping follows it.
//! - Editing cancels the previous reminder before scheduling a new one.
//! - Creation time comes from the injected clock and is never edited.

use crate::clock::{Clock, SystemClock};
use crate::feed::grouping::{GroupingLabels, NoteGrouper, NoteListItem, SortPolicy};
use crate::model::note::{Category, Note, NoteDraft, NoteFlag, NoteId, NoteValidationError};
use crate::reminder::{Reminder, ReminderScheduler, ScheduleOutcome};
use crate::repo::note_repo::{NoteFilter, NoteRepository, RepoError, RepoResult};
use chrono::Local;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Draft rejected before any write.
    Validation(NoteValidationError),
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ServiceResult<T> = Result<T, NoteServiceError>;

/// Note service facade over a store and a reminder scheduler.
pub struct NoteService<R: NoteRepository, S: ReminderScheduler> {
    repo: R,
    scheduler: S,
    clock: Arc<dyn Clock>,
    grouper: NoteGrouper<Local>,
}

impl<R: NoteRepository, S: ReminderScheduler> NoteService<R, S> {
    pub fn new(repo: R, scheduler: S) -> Self {
        Self {
            repo,
            scheduler,
            clock: Arc::new(SystemClock),
            grouper: NoteGrouper::new(Local),
        }
    }

    /// Replaces the time source used for creation stamps and feeds.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replaces the "Today"/"Yesterday" header labels.
    pub fn with_labels(mut self, labels: GroupingLabels) -> Self {
        self.grouper = NoteGrouper::with_labels(Local, labels);
        self
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Creates a note from dialog input and schedules its reminder.
    pub fn create_note(&self, draft: &NoteDraft) -> ServiceResult<Note> {
        draft.validate()?;

        let note = Note::from_draft(draft, self.clock.now_ms());
        let id = self.repo.insert_note(&note)?;
        let created = self
            .repo
            .get_note(id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))?;
        info!("event=note_create module=service status=ok note_id={id}");

        self.schedule_reminder(&created);
        Ok(created)
    }

    /// Replaces the editable fields of `existing` and reschedules its reminder.
    ///
    /// Editing a note that no longer exists writes nothing and returns the
    /// edited copy unchanged.
    pub fn edit_note(&self, existing: &Note, draft: &NoteDraft) -> ServiceResult<Note> {
        draft.validate()?;

        let edited = existing.apply_draft(draft);
        if !edited.is_saved() {
            warn!("event=note_edit module=service status=skipped note_id=0 reason=unsaved");
            return Ok(edited);
        }
        let changed = self.repo.update_note(&edited)?;
        self.scheduler.cancel(edited.id);
        if changed == 0 {
            warn!(
                "event=note_edit module=service status=skipped note_id={} reason=not_found",
                edited.id
            );
            return Ok(edited);
        }
        info!("event=note_edit module=service status=ok note_id={}", edited.id);

        self.schedule_reminder(&edited);
        Ok(edited)
    }

    /// Writes one flag value as a whole-record update.
    pub fn set_flag(&self, note: &Note, flag: NoteFlag, value: bool) -> ServiceResult<Note> {
        let mut updated = note.clone();
        updated.set_flag(flag, value);
        let changed = self.repo.update_note(&updated)?;
        info!(
            "event=note_flag module=service status={} note_id={} flag={} value={value}",
            if changed == 0 { "skipped" } else { "ok" },
            updated.id,
            flag.column()
        );
        Ok(updated)
    }

    /// Flips one flag as a whole-record update.
    pub fn toggle_flag(&self, note: &Note, flag: NoteFlag) -> ServiceResult<Note> {
        self.set_flag(note, flag, !note.flag(flag))
    }

    /// Deletes one note and drops its pending reminder.
    pub fn delete_note(&self, id: NoteId) -> ServiceResult<usize> {
        let changed = self.repo.delete_note(id)?;
        self.scheduler.cancel(id);
        info!("event=note_delete module=service status=ok note_id={id} rows={changed}");
        Ok(changed)
    }

    /// Deletes every archived note and drops their pending reminders.
    pub fn clear_archive(&self) -> ServiceResult<usize> {
        let archived = self.repo.list_notes(&NoteFilter::Archived)?;
        let changed = self.repo.delete_archived_notes()?;
        for note in &archived {
            self.scheduler.cancel(note.id);
        }
        info!("event=archive_clear module=service status=ok rows={changed}");
        Ok(changed)
    }

    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.repo.get_note(id)
    }

    pub fn list(&self, filter: &NoteFilter) -> RepoResult<Vec<Note>> {
        self.repo.list_notes(filter)
    }

    /// Unarchived notes, optionally one category, filtered by `query`.
    pub fn home_notes(&self, category: Option<Category>, query: &str) -> RepoResult<Vec<Note>> {
        let filter = match category {
            Some(category) => NoteFilter::Category(category),
            None => NoteFilter::Unarchived,
        };
        let notes = self.repo.list_notes(&filter)?;
        Ok(notes
            .into_iter()
            .filter(|note| note.matches_query(query))
            .collect())
    }

    /// Favorite notes that are not archived.
    pub fn favorite_notes(&self) -> RepoResult<Vec<Note>> {
        let notes = self.repo.list_notes(&NoteFilter::Flag(NoteFlag::Favorite))?;
        Ok(notes.into_iter().filter(|note| !note.is_archived).collect())
    }

    /// Grouped home screen list.
    pub fn home_feed(
        &self,
        category: Option<Category>,
        query: &str,
    ) -> RepoResult<Vec<NoteListItem>> {
        let notes = self.home_notes(category, query)?;
        Ok(self.grouper.group(&notes, self.clock.now_ms()))
    }

    /// Grouped archive screen list, newest first inside each part.
    pub fn archive_feed(&self) -> RepoResult<Vec<NoteListItem>> {
        let notes = self.repo.list_notes(&NoteFilter::Archived)?;
        Ok(self
            .grouper
            .group_with(&notes, self.clock.now_ms(), SortPolicy::NewestFirst))
    }

    /// Grouped favorites screen list.
    pub fn favorites_feed(&self) -> RepoResult<Vec<NoteListItem>> {
        let notes = self.favorite_notes()?;
        Ok(self.grouper.group(&notes, self.clock.now_ms()))
    }

    fn schedule_reminder(&self, note: &Note) -> Option<ScheduleOutcome> {
        Reminder::for_note(note).map(|reminder| self.scheduler.schedule(reminder))
    }
}
