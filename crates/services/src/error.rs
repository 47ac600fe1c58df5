//! Shared error types for the services crate.

use std::time::Duration;

use thiserror::Error;

use nihongo_core::model::{ChoiceId, QuestionId, SectionType};
use storage::sqlite::SqliteInitError;

use crate::exam::ExamPhase;

/// Errors emitted by the exam HTTP API.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("invalid API base url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("exam API request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("exam API returned an invalid payload: {0}")]
    InvalidPayload(#[from] nihongo_core::Error),
}

/// Errors emitted by `ExamSessionController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExamError {
    #[error("could not load test: {0}")]
    Load(#[source] ApiError),
    #[error("could not submit answers: {0}")]
    Submission(#[source] ApiError),
    #[error("submission timed out after {0:?}")]
    SubmissionTimedOut(Duration),
    #[error("illegal exam transition from {from:?} to {to:?}")]
    InvalidTransition { from: ExamPhase, to: ExamPhase },
    #[error("answers can only change while the exam is in progress")]
    AnswersLocked,
    #[error("question {0} is not part of this test")]
    UnknownQuestion(QuestionId),
    #[error("choice {choice} does not belong to question {question}")]
    UnknownChoice {
        question: QuestionId,
        choice: ChoiceId,
    },
    #[error("test has no {0} section")]
    UnknownSection(SectionType),
    #[error("manual submission requires confirmation")]
    NotConfirmed,
    #[error("attempt was already submitted")]
    AlreadySubmitted,
}

impl ExamError {
    /// Whether calling `submit` again may succeed with the same answers.
    #[must_use]
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ExamError::Submission(_) | ExamError::SubmissionTimedOut(_)
        )
    }
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Api(#[from] ApiError),
}
