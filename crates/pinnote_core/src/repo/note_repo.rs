//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide single-statement CRUD and filtered reads over the `notes` table.
//! - Keep SQL and column mapping inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Note::validate()` before SQL mutations.
//! - Updates replace the whole record; they never touch `id`.
//! - Update/delete on a missing id affects zero rows and is not an error.
//! - Every read is ordered by `isPinned DESC, timestamp DESC, id DESC`.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::DbError;
use crate::model::note::{Category, Note, NoteColor, NoteFlag, NoteId, NoteValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    timestamp,
    color,
    reminderTime,
    category,
    isPinned,
    isFavorite,
    isArchived
FROM notes";

const NOTE_ORDER_SQL: &str = " ORDER BY isPinned DESC, timestamp DESC, id DESC";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Read filters supported by the note store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteFilter {
    /// Every note, archived or not.
    All,
    Unarchived,
    Archived,
    /// Unarchived notes in one category.
    Category(Category),
    /// Notes with the given flag set.
    Flag(NoteFlag),
    /// Case-insensitive substring match on title or description.
    Search(String),
}

/// Repository interface for the note store.
pub trait NoteRepository {
    /// Inserts a note and returns the store-assigned id. `note.id` is ignored.
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId>;
    /// Replaces the row matching `note.id`; returns affected rows.
    fn update_note(&self, note: &Note) -> RepoResult<usize>;
    /// Deletes one note; returns affected rows.
    fn delete_note(&self, id: NoteId) -> RepoResult<usize>;
    /// Deletes every archived note; returns affected rows.
    fn delete_archived_notes(&self) -> RepoResult<usize>;
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    fn list_notes(&self, filter: &NoteFilter) -> RepoResult<Vec<Note>>;
}

impl<R: NoteRepository + ?Sized> NoteRepository for &R {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        (**self).insert_note(note)
    }

    fn update_note(&self, note: &Note) -> RepoResult<usize> {
        (**self).update_note(note)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<usize> {
        (**self).delete_note(id)
    }

    fn delete_archived_notes(&self) -> RepoResult<usize> {
        (**self).delete_archived_notes()
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        (**self).get_note(id)
    }

    fn list_notes(&self, filter: &NoteFilter) -> RepoResult<Vec<Note>> {
        (**self).list_notes(filter)
    }
}

/// SQLite-backed note repository over a borrowed, migrated connection.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        note.validate()?;

        self.conn.execute(
            "INSERT INTO notes (
                title,
                description,
                timestamp,
                color,
                reminderTime,
                category,
                isPinned,
                isFavorite,
                isArchived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                note.title.as_str(),
                note.description.as_str(),
                note.timestamp,
                color_to_db(note.color),
                note.reminder_time,
                note.category.as_str(),
                bool_to_int(note.is_pinned),
                bool_to_int(note.is_favorite),
                bool_to_int(note.is_archived),
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn update_note(&self, note: &Note) -> RepoResult<usize> {
        note.validate()?;

        let changed = self.conn.execute(
            "UPDATE notes
             SET
                title = ?1,
                description = ?2,
                timestamp = ?3,
                color = ?4,
                reminderTime = ?5,
                category = ?6,
                isPinned = ?7,
                isFavorite = ?8,
                isArchived = ?9
             WHERE id = ?10;",
            params![
                note.title.as_str(),
                note.description.as_str(),
                note.timestamp,
                color_to_db(note.color),
                note.reminder_time,
                note.category.as_str(),
                bool_to_int(note.is_pinned),
                bool_to_int(note.is_favorite),
                bool_to_int(note.is_archived),
                note.id,
            ],
        )?;

        Ok(changed)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE id = ?1;", [id])?;
        Ok(changed)
    }

    fn delete_archived_notes(&self) -> RepoResult<usize> {
        let changed = self
            .conn
            .execute("DELETE FROM notes WHERE isArchived = 1;", [])?;
        Ok(changed)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_note_row(row)?));
        }

        Ok(None)
    }

    fn list_notes(&self, filter: &NoteFilter) -> RepoResult<Vec<Note>> {
        let mut sql = String::from(NOTE_SELECT_SQL);
        let mut bind_values: Vec<Value> = Vec::new();

        match filter {
            NoteFilter::All => {}
            NoteFilter::Unarchived => sql.push_str(" WHERE isArchived = 0"),
            NoteFilter::Archived => sql.push_str(" WHERE isArchived = 1"),
            NoteFilter::Category(category) => {
                sql.push_str(" WHERE isArchived = 0 AND (category = ? COLLATE NOCASE");
                bind_values.push(Value::Text(category.as_str().to_string()));
                if *category == Category::General {
                    sql.push_str(" OR category IS NULL OR TRIM(category) = ''");
                }
                sql.push(')');
            }
            NoteFilter::Flag(flag) => {
                sql.push_str(&format!(" WHERE {} = 1", flag.column()));
            }
            NoteFilter::Search(text) => {
                sql.push_str(
                    " WHERE (title LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\')",
                );
                bind_values.push(Value::Text(like_pattern(text)));
            }
        }

        sql.push_str(NOTE_ORDER_SQL);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }
}

/// Builds a `LIKE` pattern matching `text` literally anywhere in a column.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let category = match row.get::<_, Option<String>>("category")? {
        None => Category::default(),
        Some(value) => Category::parse(&value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid category `{value}` in notes.category"))
        })?,
    };

    let note = Note {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        timestamp: row.get("timestamp")?,
        color: color_from_db(row.get("color")?)?,
        reminder_time: row.get("reminderTime")?,
        category,
        is_pinned: parse_flag(row, NoteFlag::Pinned)?,
        is_favorite: parse_flag(row, NoteFlag::Favorite)?,
        is_archived: parse_flag(row, NoteFlag::Archived)?,
    };
    note.validate()?;
    Ok(note)
}

fn parse_flag(row: &Row<'_>, flag: NoteFlag) -> RepoResult<bool> {
    let column = flag.column();
    match row.get::<_, Option<i64>>(column)? {
        None | Some(0) => Ok(false),
        Some(1) => Ok(true),
        Some(other) => Err(RepoError::InvalidData(format!(
            "invalid {column} value `{other}` in notes.{column}"
        ))),
    }
}

// Colors are stored the way a signed 32-bit ARGB int reads back from SQLite,
// so rows written as negative ints and as unsigned values both decode.
fn color_to_db(color: NoteColor) -> i64 {
    i64::from(color.argb() as i32)
}

fn color_from_db(value: i64) -> RepoResult<NoteColor> {
    if let Ok(signed) = i32::try_from(value) {
        return Ok(NoteColor(signed as u32));
    }
    u32::try_from(value)
        .map(NoteColor)
        .map_err(|_| RepoError::InvalidData(format!("invalid color `{value}` in notes.color")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
