//! Core domain logic for PinNote.
//! This crate is the single source of truth for note invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod feed;
pub mod logging;
pub mod model;
pub mod reminder;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::CoreConfig;
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use feed::detail::{DetailError, NoteDetail};
pub use feed::grouping::{GroupingLabels, NoteGrouper, NoteListItem, SortPolicy};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::note::{
    Category, Note, NoteColor, NoteDraft, NoteFlag, NoteId, NoteValidationError,
};
pub use reminder::notify::{Notification, Notifier, NotifyError, QueueNotifier};
pub use reminder::scheduler::TokioReminderScheduler;
pub use reminder::{Reminder, ReminderScheduler, ScheduleOutcome};
pub use repo::note_repo::{
    NoteFilter, NoteRepository, RepoError, RepoResult, SqliteNoteRepository,
};
pub use repo::store::FileNoteStore;
pub use service::note_service::{NoteService, NoteServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
