//! File-backed note store with per-call connections.
//!
//! # Responsibility
//! - Expose `NoteRepository` over a database path instead of a live
//!   connection.
//!
//! # Invariants
//! - Every call opens its own connection and releases it before returning.
//! - No state is cached between calls; the database file is the only state.

use crate::db::open_db;
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteFilter, NoteRepository, RepoResult, SqliteNoteRepository};
use std::path::{Path, PathBuf};

/// Note store that opens the database for each operation.
#[derive(Debug, Clone)]
pub struct FileNoteStore {
    path: PathBuf,
}

impl FileNoteStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn with_repo<T>(
        &self,
        f: impl FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<T>,
    ) -> RepoResult<T> {
        let conn = open_db(&self.path)?;
        let repo = SqliteNoteRepository::new(&conn);
        f(&repo)
    }
}

impl NoteRepository for FileNoteStore {
    fn insert_note(&self, note: &Note) -> RepoResult<NoteId> {
        self.with_repo(|repo| repo.insert_note(note))
    }

    fn update_note(&self, note: &Note) -> RepoResult<usize> {
        self.with_repo(|repo| repo.update_note(note))
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<usize> {
        self.with_repo(|repo| repo.delete_note(id))
    }

    fn delete_archived_notes(&self) -> RepoResult<usize> {
        self.with_repo(|repo| repo.delete_archived_notes())
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.with_repo(|repo| repo.get_note(id))
    }

    fn list_notes(&self, filter: &NoteFilter) -> RepoResult<Vec<Note>> {
        self.with_repo(|repo| repo.list_notes(filter))
    }
}
