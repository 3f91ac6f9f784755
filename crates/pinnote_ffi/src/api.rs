//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose note, feed and reminder use-cases to Dart via FRB.
//! - Translate core errors into flat response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every note call opens its own database connection.
//! - One reminder runtime per process; fired reminders are buffered until
//!   `reminders_drain_fired` is called.

use log::warn;
use once_cell::sync::OnceCell;
use pinnote_core::reminder::notify::QueueNotifier;
use pinnote_core::reminder::picker::next_local_reminder_time;
use pinnote_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, Category, CoreConfig,
    FileNoteStore, Note, NoteColor, NoteDraft, NoteFlag, NoteListItem, NoteService,
    NoteServiceError, SystemClock, TokioReminderScheduler,
};
use std::fmt::Display;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tokio::runtime::{Builder, Runtime};

static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static REMINDERS: OnceCell<ReminderRuntime> = OnceCell::new();

type FfiScheduler = TokioReminderScheduler<Arc<QueueNotifier>>;
type FfiNoteService<'a> = NoteService<FileNoteStore, &'a FfiScheduler>;

struct ReminderRuntime {
    _runtime: Runtime,
    scheduler: FfiScheduler,
    notifier: Arc<QueueNotifier>,
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Initializes logging from `PINNOTE_LOG_LEVEL` / `PINNOTE_LOG_DIR`.
///
/// # FFI contract
/// - Sync call; a no-op returning empty string when `PINNOTE_LOG_DIR` is unset.
/// - Unsupported level names fall back to the build default.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging_from_env() -> String {
    match CoreConfig::from_env().init_logging() {
        Ok(_) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Note record as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    /// ARGB color.
    pub color: u32,
    pub reminder_time: Option<i64>,
    /// Lowercase category key (`general|work|study|personal|other`).
    pub category: String,
    pub is_pinned: bool,
    pub is_favorite: bool,
    pub is_archived: bool,
}

impl From<Note> for NoteItem {
    fn from(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            description: note.description,
            timestamp: note.timestamp,
            color: note.color.argb(),
            reminder_time: note.reminder_time,
            category: note.category.as_str().to_string(),
            is_pinned: note.is_pinned,
            is_favorite: note.is_favorite,
            is_archived: note.is_archived,
        }
    }
}

/// Create/edit dialog values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInput {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub reminder_time: Option<i64>,
    /// Category key or label; blank means `general`.
    pub category: String,
}

impl NoteInput {
    fn to_draft(&self) -> Result<NoteDraft, String> {
        let category = Category::parse(&self.category)
            .ok_or_else(|| format!("unknown category `{}`", self.category.trim()))?;
        Ok(NoteDraft {
            title: self.title.clone(),
            description: self.description.clone(),
            color: NoteColor(self.color),
            reminder_time: self.reminder_time,
            category,
        })
    }
}

/// Single-note response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteResponse {
    pub ok: bool,
    pub note: Option<NoteItem>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl NoteResponse {
    fn success(message: impl Into<String>, note: Note) -> Self {
        Self {
            ok: true,
            note: Some(note.into()),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            note: None,
            message: message.into(),
        }
    }
}

/// Row-count response envelope for delete calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountResponse {
    pub ok: bool,
    pub count: u64,
    pub message: String,
}

/// One row of a grouped list: exactly one of `header` or `note` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub header: Option<String>,
    pub note: Option<NoteItem>,
}

impl From<NoteListItem> for FeedEntry {
    fn from(item: NoteListItem) -> Self {
        match item {
            NoteListItem::Header(label) => Self {
                header: Some(label),
                note: None,
            },
            NoteListItem::Item(note) => Self {
                header: None,
                note: Some(note.into()),
            },
        }
    }
}

/// Grouped list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedResponse {
    pub ok: bool,
    pub items: Vec<FeedEntry>,
    pub message: String,
}

/// Reminder notification posted while the app was running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredReminder {
    pub notification_id: i32,
    pub note_id: i64,
    pub title: String,
    pub body: String,
    /// Epoch milliseconds at which the reminder fired.
    pub posted_at: i64,
}

/// Category choice for the dialog dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryOption {
    pub key: String,
    pub label: String,
}

/// Creates a note and schedules its reminder when it lies in the future.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn note_create(input: NoteInput) -> NoteResponse {
    let result = input
        .to_draft()
        .and_then(|draft| with_note_service(|service| service.create_note(&draft)));
    match result {
        Ok(note) => NoteResponse::success("Note created.", note),
        Err(err) => NoteResponse::failure(failure_message("note_create", err)),
    }
}

/// Replaces the editable fields of note `id` and reschedules its reminder.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; unknown ids return `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_edit(id: i64, input: NoteInput) -> NoteResponse {
    let result = input.to_draft().and_then(|draft| {
        with_note_service(|service| -> Result<Option<Note>, NoteServiceError> {
            let existing = match service.get_note(id)? {
                Some(note) => note,
                None => return Ok(None),
            };
            service.edit_note(&existing, &draft).map(Some)
        })
    });
    match result {
        Ok(Some(note)) => NoteResponse::success("Note updated.", note),
        Ok(None) => NoteResponse::failure(format!("note_edit failed: note {id} not found")),
        Err(err) => NoteResponse::failure(failure_message("note_edit", err)),
    }
}

/// Flips one flag (`pinned|favorite|archived`) of note `id`.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; unknown ids or flags return `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_toggle_flag(id: i64, flag: String) -> NoteResponse {
    let Some(flag) = NoteFlag::parse(&flag) else {
        return NoteResponse::failure(format!("note_toggle_flag failed: unknown flag `{flag}`"));
    };
    let result = with_note_service(|service| -> Result<Option<Note>, NoteServiceError> {
        match service.get_note(id)? {
            Some(note) => service.toggle_flag(&note, flag).map(Some),
            None => Ok(None),
        }
    });
    match result {
        Ok(Some(note)) => NoteResponse::success("Note updated.", note),
        Ok(None) => NoteResponse::failure(format!("note_toggle_flag failed: note {id} not found")),
        Err(err) => NoteResponse::failure(failure_message("note_toggle_flag", err)),
    }
}

/// Deletes note `id` and cancels its reminder.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; unknown ids succeed with `count=0`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_delete(id: i64) -> CountResponse {
    count_response("note_delete", with_note_service(|service| service.delete_note(id)))
}

/// Deletes every archived note and cancels their reminders.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn archive_clear() -> CountResponse {
    count_response("archive_clear", with_note_service(|service| service.clear_archive()))
}

/// Loads note `id` for the detail screen.
///
/// # FFI contract
/// - Sync call, DB-backed execution.
/// - Never panics; unknown ids return `ok=false`.
#[flutter_rust_bridge::frb(sync)]
pub fn note_get(id: i64) -> NoteResponse {
    match with_note_service(|service| service.get_note(id)) {
        Ok(Some(note)) => NoteResponse::success("Note loaded.", note),
        Ok(None) => NoteResponse::failure(format!("note_get failed: note {id} not found")),
        Err(err) => NoteResponse::failure(failure_message("note_get", err)),
    }
}

/// Grouped home screen list.
///
/// Input semantics:
/// - `category`: optional category key or label; `None` lists every
///   unarchived note.
/// - `query`: case-insensitive substring of title or description; empty
///   matches everything.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_home(category: Option<String>, query: String) -> FeedResponse {
    let category = match category.as_deref().map(Category::parse) {
        None => None,
        Some(Some(category)) => Some(category),
        Some(None) => {
            return feed_response(
                "feed_home",
                Err(format!("unknown category `{}`", category.unwrap_or_default())),
            );
        }
    };
    feed_response(
        "feed_home",
        with_note_service(|service| service.home_feed(category, query.trim())),
    )
}

/// Grouped archive screen list, newest first within each part.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_archive() -> FeedResponse {
    feed_response("feed_archive", with_note_service(|service| service.archive_feed()))
}

/// Grouped favorites screen list.
#[flutter_rust_bridge::frb(sync)]
pub fn feed_favorites() -> FeedResponse {
    feed_response(
        "feed_favorites",
        with_note_service(|service| service.favorites_feed()),
    )
}

/// Removes and returns reminders fired since the previous call.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never panics; returns an empty list when the reminder runtime is down.
#[flutter_rust_bridge::frb(sync)]
pub fn reminders_drain_fired() -> Vec<FiredReminder> {
    let Ok(reminders) = reminder_runtime() else {
        return Vec::new();
    };
    reminders
        .notifier
        .drain()
        .into_iter()
        .map(|notification| FiredReminder {
            notification_id: notification.id,
            note_id: notification.note_id,
            title: notification.title,
            body: notification.body,
            posted_at: notification.posted_at,
        })
        .collect()
}

/// Next local occurrence of `hour:minute` strictly after now, epoch ms.
///
/// Returns `None` for an out-of-range time.
#[flutter_rust_bridge::frb(sync)]
pub fn reminder_next_time(hour: u32, minute: u32) -> Option<i64> {
    next_local_reminder_time(&SystemClock, hour, minute)
}

/// Note color choices, ARGB.
#[flutter_rust_bridge::frb(sync)]
pub fn palette_colors() -> Vec<u32> {
    NoteColor::PALETTE.iter().map(|color| color.argb()).collect()
}

/// Category choices in display order.
#[flutter_rust_bridge::frb(sync)]
pub fn categories() -> Vec<CategoryOption> {
    Category::ALL
        .iter()
        .map(|category| CategoryOption {
            key: category.as_str().to_string(),
            label: category.label().to_string(),
        })
        .collect()
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| CoreConfig::from_env().db_path)
        .clone()
}

fn reminder_runtime() -> Result<&'static ReminderRuntime, String> {
    REMINDERS.get_or_try_init(|| {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("pinnote-reminders")
            .enable_time()
            .build()
            .map_err(|err| format!("reminder runtime init failed: {err}"))?;
        let notifier = Arc::new(QueueNotifier::new());
        let scheduler = TokioReminderScheduler::new(
            runtime.handle().clone(),
            Arc::new(SystemClock),
            Arc::clone(&notifier),
        );
        Ok(ReminderRuntime {
            _runtime: runtime,
            scheduler,
            notifier,
        })
    })
}

fn with_note_service<T, E: Display>(
    f: impl FnOnce(&FfiNoteService<'static>) -> Result<T, E>,
) -> Result<T, String> {
    let reminders = reminder_runtime()?;
    let service = NoteService::new(FileNoteStore::new(resolve_db_path()), &reminders.scheduler);
    f(&service).map_err(|err| err.to_string())
}

fn failure_message(op: &str, err: String) -> String {
    warn!("event=ffi_call module=ffi status=error op={op}");
    format!("{op} failed: {err}")
}

fn count_response(op: &str, result: Result<usize, String>) -> CountResponse {
    match result {
        Ok(count) => CountResponse {
            ok: true,
            count: count as u64,
            message: format!("{count} note(s) deleted."),
        },
        Err(err) => CountResponse {
            ok: false,
            count: 0,
            message: failure_message(op, err),
        },
    }
}

fn feed_response(op: &str, result: Result<Vec<NoteListItem>, String>) -> FeedResponse {
    match result {
        Ok(items) => {
            let notes = items.iter().filter(|item| item.as_note().is_some()).count();
            FeedResponse {
                ok: true,
                items: items.into_iter().map(FeedEntry::from).collect(),
                message: format!("{notes} note(s)."),
            }
        }
        Err(err) => FeedResponse {
            ok: false,
            items: Vec::new(),
            message: failure_message(op, err),
        },
    }
}
