use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use nihongo_core::model::{LessonId, LessonStatus};
use nihongo_core::time::{fixed_clock, fixed_now};
use services::LessonProgressStore;
use storage::repository::{InMemoryStore, KeyValueStore, StorageError};

/// Store whose every call fails, like a full or locked disk.
struct BrokenStore;

#[async_trait]
impl KeyValueStore for BrokenStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Connection("disk unavailable".into()))
    }
}

/// In-memory store whose reads can be made to fail while writes still land.
#[derive(Default)]
struct FlakyReads {
    inner: InMemoryStore,
    failing: AtomicBool,
}

#[async_trait]
impl KeyValueStore for FlakyReads {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StorageError::Connection("database is locked".into()));
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key).await
    }
}

fn store() -> LessonProgressStore {
    LessonProgressStore::new(Arc::new(InMemoryStore::new()), fixed_clock())
}

#[tokio::test]
async fn untouched_lesson_loads_as_not_started() {
    let record = store().load(LessonId::new(3)).await;
    assert_eq!(record.status(), LessonStatus::NotStarted);
    assert_eq!(record.current_index(), 0);
    assert_eq!(record.updated_at(), None);
}

#[tokio::test]
async fn three_of_five_items_is_sixty_percent() {
    let store = store();
    let lesson = LessonId::new(5);

    for _ in 0..3 {
        store.advance(lesson, 5).await;
    }

    let record = store.load(lesson).await;
    assert_eq!(record.current_index(), 3);
    assert_eq!(record.total_items(), 5);
    assert_eq!(record.percentage(), 60);
    assert_eq!(record.status(), LessonStatus::InProgress);
    assert_eq!(record.updated_at(), Some(fixed_now()));
    assert_eq!(store.restore(lesson).await, 3);
}

#[tokio::test]
async fn advancing_every_item_completes_the_lesson() {
    let store = store();
    let lesson = LessonId::new(8);

    let mut last = store.load(lesson).await;
    for _ in 0..4 {
        last = store.advance(lesson, 4).await;
    }

    assert_eq!(last.status(), LessonStatus::Completed);
    assert_eq!(last.percentage(), 100);
    assert_eq!(last.current_index(), 4);
    assert_eq!(store.load(lesson).await, last);

    let again = store.advance(lesson, 4).await;
    assert_eq!(again, last);
    assert_eq!(store.restore(lesson).await, 0);
}

#[tokio::test]
async fn restore_is_idempotent() {
    let store = store();
    let lesson = LessonId::new(2);
    store.advance(lesson, 10).await;
    store.advance(lesson, 10).await;

    let first = store.restore(lesson).await;
    let second = store.restore(lesson).await;
    assert_eq!(first, 2);
    assert_eq!(first, second);
}

#[tokio::test]
async fn lessons_are_tracked_independently() {
    let store = store();
    store.advance(LessonId::new(1), 3).await;
    store.advance(LessonId::new(1), 3).await;
    store.advance(LessonId::new(2), 3).await;

    assert_eq!(store.restore(LessonId::new(1)).await, 2);
    assert_eq!(store.restore(LessonId::new(2)).await, 1);
}

#[tokio::test]
async fn broken_storage_never_blocks_the_lesson() {
    let store = LessonProgressStore::new(Arc::new(BrokenStore), fixed_clock());
    let lesson = LessonId::new(1);

    let record = store.advance(lesson, 4).await;
    assert_eq!(record.current_index(), 1);
    assert_eq!(record.status(), LessonStatus::InProgress);

    assert_eq!(store.load(lesson).await.status(), LessonStatus::NotStarted);
    assert_eq!(store.restore(lesson).await, 0);
    store.reset(lesson).await;
}

#[tokio::test]
async fn progress_survives_a_new_store_over_the_same_backend() {
    let kv: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
    LessonProgressStore::new(Arc::clone(&kv), fixed_clock())
        .advance(LessonId::new(9), 6)
        .await;

    let reopened = LessonProgressStore::new(kv, fixed_clock());
    assert_eq!(reopened.restore(LessonId::new(9)).await, 1);
}

#[tokio::test]
async fn failed_read_does_not_overwrite_saved_progress() {
    let kv = Arc::new(FlakyReads::default());
    let store = LessonProgressStore::new(kv.clone(), fixed_clock());
    let lesson = LessonId::new(4);
    for _ in 0..3 {
        store.advance(lesson, 5).await;
    }

    kv.failing.store(true, Ordering::SeqCst);
    let shown = store.advance(lesson, 5).await;
    assert_eq!(shown.current_index(), 1);

    kv.failing.store(false, Ordering::SeqCst);
    assert_eq!(store.restore(lesson).await, 3);
}
