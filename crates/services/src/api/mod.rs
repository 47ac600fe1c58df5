mod dto;
mod http;

use async_trait::async_trait;
use nihongo_core::model::{
    AnswerPair, AttemptId, AttemptResult, AttemptReview, JlptLevel, Test, TestId, TestSummary,
};

use crate::error::ApiError;

pub use http::{ApiConfig, DEFAULT_API_BASE_URL, HttpExamApi};

/// Remote JLPT practice backend.
///
/// Tests handed out by `fetch_test` carry no correct-choice markers; only
/// `fetch_attempt` reveals them.
#[async_trait]
pub trait ExamApi: Send + Sync {
    /// Published tests for one level.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the payload is malformed.
    async fn list_tests(&self, level: JlptLevel) -> Result<Vec<TestSummary>, ApiError>;

    /// Full test content for a live attempt.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the payload is malformed.
    async fn fetch_test(&self, test_id: TestId) -> Result<Test, ApiError>;

    /// Submit answers and receive the graded result.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the payload is malformed.
    async fn submit(
        &self,
        test_id: TestId,
        answers: &[AnswerPair],
    ) -> Result<AttemptResult, ApiError>;

    /// A finished attempt with correct choices and the learner's picks.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the payload is malformed.
    async fn fetch_attempt(&self, attempt_id: AttemptId) -> Result<AttemptReview, ApiError>;
}
