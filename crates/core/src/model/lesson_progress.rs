use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::attempt::rounded_percent;
use crate::model::ids::LessonId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonProgressError {
    #[error("lesson has no items")]
    EmptyLesson,

    #[error("current index {current} is past total item count {total}")]
    IndexOutOfRange { current: u32, total: u32 },

    #[error("status {status} does not match index {current}/{total} at {percentage}%")]
    InconsistentStatus {
        status: LessonStatus,
        current: u32,
        total: u32,
        percentage: u8,
    },

    #[error("unknown lesson status: {0}")]
    UnknownStatus(String),
}

//
// ─── STATUS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
}

impl LessonStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LessonStatus::NotStarted => "not_started",
            LessonStatus::InProgress => "in_progress",
            LessonStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for LessonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonStatus {
    type Err = LessonProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(LessonStatus::NotStarted),
            "in_progress" => Ok(LessonStatus::InProgress),
            "completed" => Ok(LessonStatus::Completed),
            other => Err(LessonProgressError::UnknownStatus(other.to_owned())),
        }
    }
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// How far the learner has advanced through one lesson.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonProgressRecord {
    lesson_id: LessonId,
    current_index: u32,
    total_items: u32,
    percentage: u8,
    status: LessonStatus,
    updated_at: Option<DateTime<Utc>>,
}

impl LessonProgressRecord {
    /// Progress of a lesson that has never been advanced.
    #[must_use]
    pub fn not_started(lesson_id: LessonId) -> Self {
        Self {
            lesson_id,
            current_index: 0,
            total_items: 0,
            percentage: 0,
            status: LessonStatus::NotStarted,
            updated_at: None,
        }
    }

    /// Rehydrate a record from storage.
    ///
    /// # Errors
    ///
    /// Returns `LessonProgressError` if the index exceeds the total or the
    /// status, index and percentage disagree.
    pub fn from_persisted(
        lesson_id: LessonId,
        current_index: u32,
        total_items: u32,
        percentage: u8,
        status: LessonStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, LessonProgressError> {
        if current_index > total_items {
            return Err(LessonProgressError::IndexOutOfRange {
                current: current_index,
                total: total_items,
            });
        }

        let consistent = percentage <= 100
            && match status {
                LessonStatus::NotStarted => current_index == 0,
                LessonStatus::InProgress => current_index < total_items,
                LessonStatus::Completed => {
                    total_items > 0 && current_index == total_items && percentage == 100
                }
            };
        if !consistent {
            return Err(LessonProgressError::InconsistentStatus {
                status,
                current: current_index,
                total: total_items,
                percentage,
            });
        }

        Ok(Self {
            lesson_id,
            current_index,
            total_items,
            percentage,
            status,
            updated_at: Some(updated_at),
        })
    }

    /// The record after the learner moves past one more item.
    ///
    /// A completed lesson stays completed. If the lesson shrank since the last
    /// write, the index is clamped to the new item count.
    ///
    /// # Errors
    ///
    /// Returns `LessonProgressError::EmptyLesson` when `total_items` is zero.
    pub fn advanced(&self, total_items: u32, now: DateTime<Utc>) -> Result<Self, LessonProgressError> {
        if total_items == 0 {
            return Err(LessonProgressError::EmptyLesson);
        }
        if self.is_completed() {
            return Ok(self.clone());
        }

        let next = self.current_index.saturating_add(1).min(total_items);
        let (status, percentage) = if next == total_items {
            (LessonStatus::Completed, 100)
        } else {
            (LessonStatus::InProgress, rounded_percent(next, total_items))
        };

        Ok(Self {
            lesson_id: self.lesson_id,
            current_index: next,
            total_items,
            percentage,
            status,
            updated_at: Some(now),
        })
    }

    /// Where a reopened lesson should start: the saved position while in
    /// progress, the beginning otherwise (a completed lesson replays from 0).
    #[must_use]
    pub fn seek_index(&self) -> u32 {
        match self.status {
            LessonStatus::InProgress => self.current_index,
            LessonStatus::NotStarted | LessonStatus::Completed => 0,
        }
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn current_index(&self) -> u32 {
        self.current_index
    }

    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn status(&self) -> LessonStatus {
        self.status
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == LessonStatus::Completed
    }

    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn advancing_through_every_item_completes() {
        let mut record = LessonProgressRecord::not_started(LessonId::new(1));
        for _ in 0..4 {
            record = record.advanced(4, fixed_now()).unwrap();
        }
        assert_eq!(record.status(), LessonStatus::Completed);
        assert_eq!(record.current_index(), 4);
        assert_eq!(record.percentage(), 100);
        assert_eq!(record.seek_index(), 0);
    }

    #[test]
    fn in_progress_percentage_is_rounded() {
        let record = LessonProgressRecord::not_started(LessonId::new(1))
            .advanced(3, fixed_now())
            .unwrap();
        assert_eq!(record.status(), LessonStatus::InProgress);
        assert_eq!(record.percentage(), 33);
        assert_eq!(record.seek_index(), 1);
        assert_eq!(record.updated_at(), Some(fixed_now()));
    }

    #[test]
    fn last_item_of_long_lesson_stays_in_progress() {
        let mut record = LessonProgressRecord::not_started(LessonId::new(1));
        for _ in 0..199 {
            record = record.advanced(200, fixed_now()).unwrap();
        }
        assert_eq!(record.status(), LessonStatus::InProgress);
        assert_eq!(record.percentage(), 100);
        assert_eq!(record.seek_index(), 199);
    }

    #[test]
    fn completed_lesson_does_not_move() {
        let done = LessonProgressRecord::from_persisted(
            LessonId::new(1),
            2,
            2,
            100,
            LessonStatus::Completed,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(done.advanced(2, fixed_now()).unwrap(), done);
    }

    #[test]
    fn shrunk_lesson_clamps_index() {
        let record = LessonProgressRecord::from_persisted(
            LessonId::new(1),
            5,
            10,
            50,
            LessonStatus::InProgress,
            fixed_now(),
        )
        .unwrap();
        let next = record.advanced(4, fixed_now()).unwrap();
        assert_eq!(next.current_index(), 4);
        assert!(next.is_completed());
    }

    #[test]
    fn empty_lesson_is_rejected() {
        let record = LessonProgressRecord::not_started(LessonId::new(1));
        assert_eq!(
            record.advanced(0, fixed_now()),
            Err(LessonProgressError::EmptyLesson)
        );
    }

    #[test]
    fn persisted_invariants_are_enforced() {
        let err = LessonProgressRecord::from_persisted(
            LessonId::new(1),
            6,
            5,
            100,
            LessonStatus::Completed,
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, LessonProgressError::IndexOutOfRange { .. }));

        let err = LessonProgressRecord::from_persisted(
            LessonId::new(1),
            5,
            5,
            100,
            LessonStatus::InProgress,
            fixed_now(),
        )
        .unwrap_err();
        assert!(matches!(err, LessonProgressError::InconsistentStatus { .. }));
    }

    #[test]
    fn status_parses_storage_names() {
        assert_eq!(
            "in_progress".parse::<LessonStatus>().unwrap(),
            LessonStatus::InProgress
        );
        assert!("done".parse::<LessonStatus>().is_err());
    }
}
