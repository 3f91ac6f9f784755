//! SQLite migration registry and executor for the `notes` table.
//!
//! # Responsibility
//! - Register additive schema steps in strictly increasing order.
//! - Apply pending steps atomically and record progress.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Steps add tables, columns or indexes; existing rows keep their data
//!   and pick up column defaults (`NULL` / `0`).
//! - The only data rewrite is step 5, which maps legacy Uzbek category
//!   labels and mixed-case English labels to the lowercase keys.
//! - Applied version is mirrored to `PRAGMA user_version`, so databases
//!   written by earlier app releases (versions 1-3) upgrade in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "notes",
        sql: include_str!("0001_notes.sql"),
    },
    Migration {
        version: 2,
        name: "reminder_category",
        sql: include_str!("0002_reminder_category.sql"),
    },
    Migration {
        version: 3,
        name: "note_flags",
        sql: include_str!("0003_note_flags.sql"),
    },
    Migration {
        version: 4,
        name: "sort_index",
        sql: include_str!("0004_sort_index.sql"),
    },
    Migration {
        version: 5,
        name: "legacy_category_labels",
        sql: include_str!("0005_legacy_category_labels.sql"),
    },
];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Applies all pending migrations on the provided connection.
///
/// Returns the number of steps applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let current_version = current_user_version(conn)?;
    let latest = latest_version();

    if current_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current_version,
            latest_supported: latest,
        });
    }

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > current_version)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
        info!(
            "event=db_migrate module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    Ok(pending.len())
}

/// Reads the schema version recorded in the database header.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}
