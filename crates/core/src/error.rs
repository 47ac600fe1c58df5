use thiserror::Error;

use crate::model::{AttemptError, LessonProgressError, MediaError, ParseIdError, TestError};

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Test(#[from] TestError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    LessonProgress(#[from] LessonProgressError),
    #[error(transparent)]
    ParseId(#[from] ParseIdError),
}
