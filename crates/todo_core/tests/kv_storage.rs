use todo_core::db::{open_db, open_db_in_memory};
use todo_core::{KeyValueStore, SqliteKeyValueStore, StorageError};

#[test]
fn set_overwrites_and_get_reads_back() {
    let mut store = SqliteKeyValueStore::new(open_db_in_memory().unwrap());

    assert_eq!(store.get("premiumTodos").unwrap(), None);
    store.set("premiumTodos", "[]").unwrap();
    store.set("premiumTodos", r#"[{"id":1,"text":"a","completed":false}]"#)
        .unwrap();

    assert_eq!(
        store.get("premiumTodos").unwrap().as_deref(),
        Some(r#"[{"id":1,"text":"a","completed":false}]"#)
    );
    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM kv_entries;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn keys_are_independent_and_removable() {
    let mut store = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
    store.set("premiumTodos", "a").unwrap();
    store.set("lovelyTodos", "b").unwrap();

    store.remove("premiumTodos").unwrap();
    store.remove("premiumTodos").unwrap();

    assert_eq!(store.get("premiumTodos").unwrap(), None);
    assert_eq!(store.get("lovelyTodos").unwrap().as_deref(), Some("b"));
}

#[test]
fn values_survive_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("kv.sqlite3");

    {
        let mut store = SqliteKeyValueStore::new(open_db(&path).unwrap());
        store.set("lovelyTodos", "[]").unwrap();
    }

    let store = SqliteKeyValueStore::new(open_db(&path).unwrap());
    assert_eq!(store.get("lovelyTodos").unwrap().as_deref(), Some("[]"));
}

#[test]
fn blank_keys_are_rejected_before_touching_sql() {
    let mut store = SqliteKeyValueStore::new(open_db_in_memory().unwrap());
    assert!(matches!(store.set("", "x"), Err(StorageError::EmptyKey)));
    assert!(matches!(store.get(" "), Err(StorageError::EmptyKey)));
}
