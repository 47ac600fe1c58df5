use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::api::{ApiConfig, ExamApi, HttpExamApi};
use crate::error::AppServicesError;
use crate::exam::{ExamConfig, ExamSessionController};
use crate::progress::LessonProgressStore;

/// Assembles the app-facing services over one storage backend and one API.
#[derive(Clone)]
pub struct AppServices {
    api: Arc<dyn ExamApi>,
    exam_config: ExamConfig,
    lesson_progress: Arc<LessonProgressStore>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage and the HTTP exam API.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        api_config: ApiConfig,
        exam_config: ExamConfig,
        clock: Clock,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        let api: Arc<dyn ExamApi> = Arc::new(HttpExamApi::new(api_config));
        Ok(Self::from_parts(storage, api, exam_config, clock))
    }

    /// Build services from already constructed backends.
    #[must_use]
    pub fn from_parts(
        storage: Storage,
        api: Arc<dyn ExamApi>,
        exam_config: ExamConfig,
        clock: Clock,
    ) -> Self {
        let lesson_progress = Arc::new(LessonProgressStore::new(Arc::clone(&storage.kv), clock));
        Self {
            api,
            exam_config,
            lesson_progress,
        }
    }

    #[must_use]
    pub fn api(&self) -> Arc<dyn ExamApi> {
        Arc::clone(&self.api)
    }

    /// A fresh controller for one exam attempt.
    #[must_use]
    pub fn exam_session(&self) -> ExamSessionController {
        ExamSessionController::new(Arc::clone(&self.api), self.exam_config.clone())
    }

    #[must_use]
    pub fn lesson_progress(&self) -> Arc<LessonProgressStore> {
        Arc::clone(&self.lesson_progress)
    }
}
