use std::sync::Arc;

use chrono::{DateTime, Utc};
use nihongo_core::Clock;
use nihongo_core::model::{LessonId, LessonProgressRecord, LessonStatus};
use serde::{Deserialize, Serialize};
use storage::repository::{KeyValueStore, StorageError};
use tracing::{debug, warn};

const KEY_PREFIX: &str = "lesson_progress_";

/// Storage key of a lesson's progress record.
#[must_use]
pub fn progress_key(lesson_id: LessonId) -> String {
    format!("{KEY_PREFIX}{lesson_id}")
}

/// On-disk JSON shape of a progress record.
#[derive(Debug, Serialize, Deserialize)]
struct StoredProgress {
    lesson_id: LessonId,
    current_index: u32,
    total_items: u32,
    percentage: u8,
    status: LessonStatus,
    updated_at: DateTime<Utc>,
}

impl StoredProgress {
    fn from_record(record: &LessonProgressRecord, updated_at: DateTime<Utc>) -> Self {
        Self {
            lesson_id: record.lesson_id(),
            current_index: record.current_index(),
            total_items: record.total_items(),
            percentage: record.percentage(),
            status: record.status(),
            updated_at,
        }
    }

    fn into_record(self) -> Result<LessonProgressRecord, nihongo_core::Error> {
        Ok(LessonProgressRecord::from_persisted(
            self.lesson_id,
            self.current_index,
            self.total_items,
            self.percentage,
            self.status,
            self.updated_at,
        )?)
    }
}

/// Best-effort per-lesson progress.
///
/// Nothing here returns an error: storage problems are logged and the lesson
/// carries on from a not-started record.
#[derive(Clone)]
pub struct LessonProgressStore {
    kv: Arc<dyn KeyValueStore>,
    clock: Clock,
}

impl LessonProgressStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>, clock: Clock) -> Self {
        Self { kv, clock }
    }

    /// Saved progress, or a not-started record when nothing usable is stored.
    pub async fn load(&self, lesson_id: LessonId) -> LessonProgressRecord {
        self.read(lesson_id).await.unwrap_or_else(|err| {
            warn!(%lesson_id, error = %err, "could not read lesson progress");
            LessonProgressRecord::not_started(lesson_id)
        })
    }

    /// Like `load`, but a backend failure is returned instead of being read as
    /// "nothing stored".
    async fn read(&self, lesson_id: LessonId) -> Result<LessonProgressRecord, StorageError> {
        let Some(raw) = self.kv.get(&progress_key(lesson_id)).await? else {
            return Ok(LessonProgressRecord::not_started(lesson_id));
        };

        let stored = match serde_json::from_str::<StoredProgress>(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                warn!(%lesson_id, error = %err, "discarding undecodable lesson progress");
                return Ok(LessonProgressRecord::not_started(lesson_id));
            }
        };
        if stored.lesson_id != lesson_id {
            warn!(%lesson_id, stored = %stored.lesson_id, "discarding progress of another lesson");
            return Ok(LessonProgressRecord::not_started(lesson_id));
        }

        Ok(stored.into_record().unwrap_or_else(|err| {
            warn!(%lesson_id, error = %err, "discarding inconsistent lesson progress");
            LessonProgressRecord::not_started(lesson_id)
        }))
    }

    /// Record that the learner moved past one more item and persist it.
    ///
    /// Returns the new record even if it could not be written. A lesson with
    /// no items leaves the saved progress untouched, and so does an advance
    /// whose read of the saved progress failed.
    pub async fn advance(&self, lesson_id: LessonId, total_items: u32) -> LessonProgressRecord {
        let (current, readable) = match self.read(lesson_id).await {
            Ok(record) => (record, true),
            Err(err) => {
                warn!(%lesson_id, error = %err, "could not read lesson progress, not saving");
                (LessonProgressRecord::not_started(lesson_id), false)
            }
        };
        let now = self.clock.now();
        let next = match current.advanced(total_items, now) {
            Ok(next) => next,
            Err(err) => {
                warn!(%lesson_id, total_items, error = %err, "not advancing lesson");
                return current;
            }
        };
        if next == current {
            return current;
        }

        debug!(
            %lesson_id,
            index = next.current_index(),
            total = next.total_items(),
            status = %next.status(),
            "lesson advanced"
        );
        if readable {
            self.write(&next, now).await;
        }
        next
    }

    /// Index a reopened lesson should seek to. Reads only.
    pub async fn restore(&self, lesson_id: LessonId) -> u32 {
        self.load(lesson_id).await.seek_index()
    }

    /// Forget the saved progress of a lesson.
    pub async fn reset(&self, lesson_id: LessonId) {
        if let Err(err) = self.kv.remove(&progress_key(lesson_id)).await {
            warn!(%lesson_id, error = %err, "could not reset lesson progress");
        }
    }

    async fn write(&self, record: &LessonProgressRecord, now: DateTime<Utc>) {
        let lesson_id = record.lesson_id();
        let stored = StoredProgress::from_record(record, record.updated_at().unwrap_or(now));
        let json = match serde_json::to_string(&stored) {
            Ok(json) => json,
            Err(err) => {
                warn!(%lesson_id, error = %err, "could not encode lesson progress");
                return;
            }
        };
        if let Err(err) = self.kv.set(&progress_key(lesson_id), &json).await {
            warn!(%lesson_id, error = %err, "could not save lesson progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nihongo_core::time::{fixed_clock, fixed_now};
    use storage::repository::InMemoryStore;

    fn store_with(kv: InMemoryStore) -> LessonProgressStore {
        LessonProgressStore::new(Arc::new(kv), fixed_clock())
    }

    #[test]
    fn key_uses_lesson_prefix() {
        assert_eq!(progress_key(LessonId::new(42)), "lesson_progress_42");
    }

    #[tokio::test]
    async fn advance_persists_json_record() {
        let kv = InMemoryStore::new();
        let store = store_with(kv.clone());

        store.advance(LessonId::new(7), 4).await;

        let raw = kv.get("lesson_progress_7").await.unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["current_index"], 1);
        assert_eq!(json["total_items"], 4);
        assert_eq!(json["percentage"], 25);
        assert_eq!(json["status"], "in_progress");
    }

    #[tokio::test]
    async fn garbage_reads_as_not_started() {
        let kv = InMemoryStore::new();
        kv.set("lesson_progress_1", "{not json").await.unwrap();
        let record = store_with(kv).load(LessonId::new(1)).await;
        assert_eq!(record, LessonProgressRecord::not_started(LessonId::new(1)));
    }

    #[tokio::test]
    async fn inconsistent_record_reads_as_not_started() {
        let kv = InMemoryStore::new();
        let bad = serde_json::json!({
            "lesson_id": 1,
            "current_index": 3,
            "total_items": 3,
            "percentage": 100,
            "status": "in_progress",
            "updated_at": fixed_now(),
        });
        kv.set("lesson_progress_1", &bad.to_string()).await.unwrap();
        let record = store_with(kv).load(LessonId::new(1)).await;
        assert_eq!(record.status(), LessonStatus::NotStarted);
    }

    #[tokio::test]
    async fn zero_total_is_ignored() {
        let kv = InMemoryStore::new();
        let store = store_with(kv.clone());
        let record = store.advance(LessonId::new(1), 0).await;
        assert_eq!(record.current_index(), 0);
        assert_eq!(kv.len().unwrap(), 0);
    }

    #[tokio::test]
    async fn reset_forgets_progress() {
        let kv = InMemoryStore::new();
        let store = store_with(kv.clone());
        store.advance(LessonId::new(1), 3).await;
        store.reset(LessonId::new(1)).await;
        assert_eq!(store.restore(LessonId::new(1)).await, 0);
        assert_eq!(kv.len().unwrap(), 0);
    }
}
