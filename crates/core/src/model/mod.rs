mod answers;
mod attempt;
mod exam;
mod ids;
mod lesson_progress;
pub mod media;

pub use ids::{AttemptId, ChoiceId, LessonId, ParseIdError, QuestionId, SectionId, TestId};

pub use answers::{AnswerMap, AnswerPair};
pub use attempt::{
    AttemptError, AttemptResult, AttemptReview, SectionResult, TopicResult, rounded_percent,
};
pub use exam::{
    Choice, JlptLevel, Question, QuestionPrompt, Section, SectionType, Test, TestError,
    TestSummary,
};
pub use lesson_progress::{LessonProgressError, LessonProgressRecord, LessonStatus};
pub use media::{AudioClip, MediaError, MediaRef};
