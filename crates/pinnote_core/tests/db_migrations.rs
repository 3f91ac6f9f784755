use pinnote_core::db::migrations::latest_version;
use pinnote_core::db::{current_user_version, open_db, open_db_in_memory, DbError};
use pinnote_core::repo::note_repo::{NoteFilter, NoteRepository, SqliteNoteRepository};
use pinnote_core::Category;
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "notes");
    for column in [
        "id",
        "title",
        "description",
        "timestamp",
        "color",
        "reminderTime",
        "category",
        "isPinned",
        "isFavorite",
        "isArchived",
    ] {
        assert!(
            note_columns(&conn).iter().any(|name| name == column),
            "missing column {column}"
        );
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pinnote.db");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO notes (title, description, timestamp, color) VALUES ('a', 'b', 1, 0)",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    let count: i64 = conn_second
        .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_data").join("notes").join("pinnote.db");

    let conn = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    assert!(path.exists());
}

#[test]
fn open_db_under_a_file_reports_directory_error() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"not a directory").unwrap();

    match open_db(blocker.join("pinnote.db")).unwrap_err() {
        DbError::CreateDir { dir, .. } => assert_eq!(dir, blocker),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn version_one_database_upgrades_with_column_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy-v1.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            color INTEGER NOT NULL
        );
        INSERT INTO notes (title, description, timestamp, color)
        VALUES ('Legacy', 'from v1', 1700000000000, -5901333);
        PRAGMA user_version = 1;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());

    let repo = SqliteNoteRepository::new(&conn);
    let notes = repo.list_notes(&NoteFilter::All).unwrap();
    assert_eq!(notes.len(), 1);
    let note = &notes[0];
    assert_eq!(note.title, "Legacy");
    assert_eq!(note.reminder_time, None);
    assert_eq!(note.category, Category::General);
    assert!(!note.is_pinned && !note.is_favorite && !note.is_archived);
    assert_eq!(note.color.argb(), 0xFFA5_F3EB);
}

#[test]
fn version_two_database_keeps_reminder_and_category() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy-v2.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            color INTEGER NOT NULL,
            reminderTime INTEGER,
            category TEXT
        );
        INSERT INTO notes (title, description, timestamp, color, reminderTime, category)
        VALUES ('Standup', 'daily', 1700000000000, 0, 1700000600000, 'Work');
        PRAGMA user_version = 2;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let notes = repo
        .list_notes(&NoteFilter::Category(Category::Work))
        .unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].reminder_time, Some(1_700_000_600_000));
    assert!(!notes[0].is_archived);
}

#[test]
fn version_three_database_with_uzbek_labels_reads_and_filters() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy-v3.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            timestamp INTEGER NOT NULL,
            color INTEGER NOT NULL,
            reminderTime INTEGER,
            category TEXT,
            isPinned INTEGER DEFAULT 0,
            isFavorite INTEGER DEFAULT 0,
            isArchived INTEGER DEFAULT 0
        );
        INSERT INTO notes (title, description, timestamp, color, category)
        VALUES ('Groceries', 'milk', 1700000000000, -5901333, 'Umumiy'),
               ('Standup', 'daily', 1700000001000, -5901333, 'Ish'),
               ('Exam', 'chapter 4', 1700000002000, -5901333, 'O''qish'),
               ('Gym', 'legs', 1700000003000, -5901333, 'Shaxsiy'),
               ('Misc', 'stuff', 1700000004000, -5901333, 'Boshqalar');
        PRAGMA user_version = 3;",
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn).unwrap(), latest_version());

    let stored: Vec<String> = conn
        .prepare("SELECT category FROM notes ORDER BY id")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(stored, vec!["general", "work", "study", "personal", "other"]);

    let repo = SqliteNoteRepository::new(&conn);
    let notes = repo.list_notes(&NoteFilter::Unarchived).unwrap();
    assert_eq!(notes.len(), 5);

    let work = repo
        .list_notes(&NoteFilter::Category(Category::Work))
        .unwrap();
    assert_eq!(work.len(), 1);
    assert_eq!(work[0].title, "Standup");

    let study = repo
        .list_notes(&NoteFilter::Category(Category::Study))
        .unwrap();
    assert_eq!(study.len(), 1);
    assert_eq!(study[0].title, "Exam");
}

#[test]
fn legacy_label_rows_written_after_upgrade_still_parse() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO notes (title, description, timestamp, color, category)
         VALUES ('Late writer', 'old client', 1, 0, 'Shaxsiy')",
        [],
    )
    .unwrap();

    let repo = SqliteNoteRepository::new(&conn);
    let notes = repo.list_notes(&NoteFilter::All).unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].category, Category::Personal);
}

fn note_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(notes);").unwrap();
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    names
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
