//! Note store persistence: one SQLite file holding the `notes` table.
//!
//! # Responsibility
//! - Open connections for `FileNoteStore`, which opens one per call.
//! - Upgrade databases written by earlier app releases in place.
//!
//! # Invariants
//! - Schema progress lives in `PRAGMA user_version`; version 3 is the last
//!   layout shipped before this core, later steps only add indexes or
//!   normalize `notes.category` labels.
//! - No repository query runs on a connection whose migrations failed.
//! - A database stamped newer than this build is refused, never downgraded.
//! - Concurrent writers wait up to the busy timeout instead of failing.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use migrations::{current_user_version, latest_version};
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure to produce a migrated note-store connection.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The directory that should hold the database file could not be created.
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    /// The file was written by a newer app release.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "note store error: {err}"),
            Self::CreateDir { dir, source } => write!(
                f,
                "cannot create note store directory `{}`: {source}",
                dir.display()
            ),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "note store schema version {db_version} was written by a newer release \
                 (this build supports up to {latest_supported})"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::CreateDir { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
