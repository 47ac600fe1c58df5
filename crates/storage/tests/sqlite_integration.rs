use storage::repository::{KeyValueStore, Storage};
use storage::sqlite::SqliteRepository;

#[tokio::test]
async fn sqlite_kv_roundtrip_and_overwrite() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_roundtrip?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    assert_eq!(repo.get("lesson_progress_1").await.unwrap(), None);

    repo.set("lesson_progress_1", r#"{"current_index":1}"#)
        .await
        .unwrap();
    repo.set("lesson_progress_1", r#"{"current_index":2}"#)
        .await
        .unwrap();

    let stored = repo.get("lesson_progress_1").await.unwrap();
    assert_eq!(stored.as_deref(), Some(r#"{"current_index":2}"#));
}

#[tokio::test]
async fn sqlite_remove_deletes_only_that_key() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_remove?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");

    repo.set("a", "1").await.unwrap();
    repo.set("b", "2").await.unwrap();
    repo.remove("a").await.unwrap();
    repo.remove("missing").await.unwrap();

    assert_eq!(repo.get("a").await.unwrap(), None);
    assert_eq!(repo.get("b").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let repo = SqliteRepository::connect("sqlite:file:memdb_kv_migrate?mode=memory&cache=shared")
        .await
        .expect("connect");
    repo.migrate().await.expect("first migrate");
    repo.set("k", "v").await.unwrap();
    repo.migrate().await.expect("second migrate");

    assert_eq!(repo.get("k").await.unwrap().as_deref(), Some("v"));
    let (applied,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM schema_migrations")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn storage_sqlite_exposes_kv() {
    let storage = Storage::sqlite("sqlite:file:memdb_kv_storage?mode=memory&cache=shared")
        .await
        .expect("storage");
    storage.kv.set("k", "v").await.unwrap();
    assert_eq!(storage.kv.get("k").await.unwrap().as_deref(), Some("v"));
}
