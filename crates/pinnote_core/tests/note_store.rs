use pinnote_core::db::open_db_in_memory;
use pinnote_core::{
    Category, FileNoteStore, Note, NoteColor, NoteFilter, NoteFlag, NoteRepository,
    NoteValidationError, RepoError, SqliteNoteRepository,
};
use std::collections::HashSet;

const T0: i64 = 1_750_000_000_000;

fn note(title: &str, timestamp: i64) -> Note {
    Note::new(title, format!("{title} body"), NoteColor::DEFAULT, timestamp)
}

fn insert(repo: &impl NoteRepository, note: &Note) -> Note {
    let id = repo.insert_note(note).unwrap();
    repo.get_note(id).unwrap().unwrap()
}

fn ids(notes: &[Note]) -> Vec<i64> {
    notes.iter().map(|note| note.id).collect()
}

#[test]
fn insert_then_read_back_equals_written_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let mut written = note("Plan trip", T0);
    written.reminder_time = Some(T0 + 60_000);
    written.category = Category::Study;
    written.is_favorite = true;
    written.color = NoteColor(0xFF81_DEEA);

    let id = repo.insert_note(&written).unwrap();
    assert!(id > 0);
    let loaded = repo.get_note(id).unwrap().unwrap();
    assert_eq!(loaded, Note { id, ..written });
}

#[test]
fn new_note_reads_back_with_default_flags_and_no_reminder() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let mut milk = Note::new("Buy milk", "2%", NoteColor(0xFFFFFF), T0);
    milk.category = Category::Personal;
    let loaded = insert(&repo, &milk);

    assert!(!loaded.is_pinned);
    assert!(!loaded.is_favorite);
    assert!(!loaded.is_archived);
    assert_eq!(loaded.reminder_time, None);
    assert_eq!(loaded.category, Category::Personal);
    assert_eq!(loaded.color, NoteColor(0xFFFFFF));
    assert_eq!(loaded.timestamp, T0);
}

#[test]
fn toggling_a_flag_leaves_other_fields_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    let original = insert(&repo, &note("Flags", T0));

    for flag in [NoteFlag::Pinned, NoteFlag::Favorite, NoteFlag::Archived] {
        let mut toggled = original.clone();
        toggled.toggle(flag);
        assert_eq!(repo.update_note(&toggled).unwrap(), 1);

        let loaded = repo.get_note(original.id).unwrap().unwrap();
        assert!(loaded.flag(flag));
        let mut reverted = loaded.clone();
        reverted.set_flag(flag, false);
        assert_eq!(reverted, original);

        repo.update_note(&original).unwrap();
    }
}

#[test]
fn archived_and_unarchived_partition_all_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    for index in 0..6 {
        let mut item = note(&format!("n{index}"), T0 + index);
        item.is_archived = index % 3 == 0;
        item.is_pinned = index % 2 == 0;
        repo.insert_note(&item).unwrap();
    }

    let archived = repo.list_notes(&NoteFilter::Archived).unwrap();
    let unarchived = repo.list_notes(&NoteFilter::Unarchived).unwrap();
    let all = repo.list_notes(&NoteFilter::All).unwrap();

    assert!(archived.iter().all(|note| note.is_archived));
    assert!(unarchived.iter().all(|note| !note.is_archived));
    let union: HashSet<i64> = ids(&archived).into_iter().chain(ids(&unarchived)).collect();
    let everything: HashSet<i64> = ids(&all).into_iter().collect();
    assert_eq!(union, everything);
    assert_eq!(archived.len() + unarchived.len(), all.len());
}

#[test]
fn reads_order_pinned_first_then_newest() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let old = insert(&repo, &note("old", T0));
    let new = insert(&repo, &note("new", T0 + 1_000));
    let mut pinned = note("pinned", T0 - 1_000);
    pinned.is_pinned = true;
    let pinned = insert(&repo, &pinned);
    let tie = insert(&repo, &note("tie", T0 + 1_000));

    let listed = repo.list_notes(&NoteFilter::All).unwrap();
    assert_eq!(ids(&listed), vec![pinned.id, tie.id, new.id, old.id]);
}

#[test]
fn category_filter_excludes_archived_and_matches_any_case() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let mut work = note("work", T0);
    work.category = Category::Work;
    let work = insert(&repo, &work);

    let mut archived_work = note("archived work", T0);
    archived_work.category = Category::Work;
    archived_work.is_archived = true;
    insert(&repo, &archived_work);

    conn.execute(
        "INSERT INTO notes (title, description, timestamp, color, category)
         VALUES ('legacy', 'label', ?1, 0, 'WORK')",
        [T0],
    )
    .unwrap();
    let general = insert(&repo, &note("general", T0));

    let listed = repo
        .list_notes(&NoteFilter::Category(Category::Work))
        .unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().any(|note| note.id == work.id));
    assert!(listed.iter().all(|note| note.category == Category::Work));

    let general_list = repo
        .list_notes(&NoteFilter::Category(Category::General))
        .unwrap();
    assert_eq!(ids(&general_list), vec![general.id]);
}

#[test]
fn flag_and_search_filters_select_matching_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let mut favorite = Note::new("Groceries", "eggs 100%", NoteColor::DEFAULT, T0);
    favorite.is_favorite = true;
    let favorite = insert(&repo, &favorite);
    let other = insert(&repo, &Note::new("Gym", "legs day", NoteColor::DEFAULT, T0));

    let favorites = repo
        .list_notes(&NoteFilter::Flag(NoteFlag::Favorite))
        .unwrap();
    assert_eq!(ids(&favorites), vec![favorite.id]);

    let search = repo
        .list_notes(&NoteFilter::Search("GROC".to_string()))
        .unwrap();
    assert_eq!(ids(&search), vec![favorite.id]);

    let by_body = repo
        .list_notes(&NoteFilter::Search("legs".to_string()))
        .unwrap();
    assert_eq!(ids(&by_body), vec![other.id]);

    let literal_percent = repo
        .list_notes(&NoteFilter::Search("0%".to_string()))
        .unwrap();
    assert_eq!(ids(&literal_percent), vec![favorite.id]);

    let wildcard = repo
        .list_notes(&NoteFilter::Search("_".to_string()))
        .unwrap();
    assert!(wildcard.is_empty());
}

#[test]
fn update_and_delete_of_missing_id_affect_zero_rows() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let mut ghost = note("ghost", T0);
    ghost.id = 42;
    assert_eq!(repo.update_note(&ghost).unwrap(), 0);
    assert_eq!(repo.delete_note(42).unwrap(), 0);
    assert!(repo.get_note(42).unwrap().is_none());
}

#[test]
fn delete_archived_removes_only_archived_notes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let kept = insert(&repo, &note("kept", T0));
    for index in 0..3 {
        let mut archived = note(&format!("gone {index}"), T0);
        archived.is_archived = true;
        repo.insert_note(&archived).unwrap();
    }

    assert_eq!(repo.delete_archived_notes().unwrap(), 3);
    assert_eq!(ids(&repo.list_notes(&NoteFilter::All).unwrap()), vec![kept.id]);
    assert_eq!(repo.delete_archived_notes().unwrap(), 0);
    assert_eq!(repo.delete_note(kept.id).unwrap(), 1);
}

#[test]
fn invalid_notes_are_rejected_before_write() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);

    let blank_title = Note::new("   ", "body", NoteColor::DEFAULT, T0);
    assert!(matches!(
        repo.insert_note(&blank_title),
        Err(RepoError::Validation(NoteValidationError::EmptyTitle))
    ));

    let stored = insert(&repo, &note("valid", T0));
    let mut blanked = stored.clone();
    blanked.description = String::new();
    assert!(matches!(
        repo.update_note(&blanked),
        Err(RepoError::Validation(NoteValidationError::EmptyDescription))
    ));
    assert_eq!(repo.get_note(stored.id).unwrap().unwrap(), stored);
    assert_eq!(repo.list_notes(&NoteFilter::All).unwrap().len(), 1);
}

#[test]
fn unknown_persisted_category_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::new(&conn);
    conn.execute(
        "INSERT INTO notes (title, description, timestamp, color, category)
         VALUES ('odd', 'row', ?1, 0, 'errands')",
        [T0],
    )
    .unwrap();

    let err = repo.list_notes(&NoteFilter::All).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn file_store_persists_across_calls() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileNoteStore::new(dir.path().join("notes.sqlite3"));

    let created = insert(&store, &note("on disk", T0));
    let mut pinned = created.clone();
    pinned.is_pinned = true;
    assert_eq!(store.update_note(&pinned).unwrap(), 1);

    let reopened = FileNoteStore::new(store.path());
    assert_eq!(reopened.get_note(created.id).unwrap(), Some(pinned));
    assert_eq!(reopened.delete_note(created.id).unwrap(), 1);
    assert!(store.list_notes(&NoteFilter::All).unwrap().is_empty());
}
