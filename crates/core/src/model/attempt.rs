use thiserror::Error;

use crate::model::answers::AnswerMap;
use crate::model::exam::{SectionType, Test};
use crate::model::ids::{AttemptId, QuestionId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("{scope}: correct count ({correct}) exceeds total ({total})")]
    CorrectExceedsTotal {
        scope: String,
        correct: u32,
        total: u32,
    },

    #[error("percentage {0} is outside 0..=100")]
    InvalidPercentage(u8),

    #[error("selected question {0} is not part of the reviewed test")]
    UnknownQuestion(QuestionId),
}

/// `round(part / whole * 100)`, halves rounding up; 0 when `whole` is 0.
#[must_use]
pub fn rounded_percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = u64::from(part.min(whole));
    let whole = u64::from(whole);
    let pct = (part * 100 + whole / 2) / whole;
    u8::try_from(pct).unwrap_or(100)
}

/// Score for one topic inside a section (e.g. kanji reading, word usage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResult {
    name: String,
    correct: u32,
    total: u32,
}

impl TopicResult {
    /// # Errors
    ///
    /// Returns `AttemptError::CorrectExceedsTotal` when `correct > total`.
    pub fn new(name: impl Into<String>, correct: u32, total: u32) -> Result<Self, AttemptError> {
        let name = name.into();
        if correct > total {
            return Err(AttemptError::CorrectExceedsTotal {
                scope: name,
                correct,
                total,
            });
        }
        Ok(Self {
            name,
            correct,
            total,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        rounded_percent(self.correct, self.total)
    }
}

/// Per-section breakdown produced by the remote scorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionResult {
    section_type: Option<SectionType>,
    title: String,
    correct: u32,
    total: u32,
    percentage: u8,
    topics: Vec<TopicResult>,
}

impl SectionResult {
    /// Rehydrate a section score from the scorer's response.
    ///
    /// `percentage` falls back to `correct / total` when the scorer omits it.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError` if counts or percentage are inconsistent.
    pub fn new(
        section_type: Option<SectionType>,
        title: impl Into<String>,
        correct: u32,
        total: u32,
        percentage: Option<u8>,
        topics: Vec<TopicResult>,
    ) -> Result<Self, AttemptError> {
        let title = title.into();
        if correct > total {
            return Err(AttemptError::CorrectExceedsTotal {
                scope: title,
                correct,
                total,
            });
        }
        let percentage = match percentage {
            Some(p) if p > 100 => return Err(AttemptError::InvalidPercentage(p)),
            Some(p) => p,
            None => rounded_percent(correct, total),
        };

        Ok(Self {
            section_type,
            title,
            correct,
            total,
            percentage,
            topics,
        })
    }

    #[must_use]
    pub fn section_type(&self) -> Option<SectionType> {
        self.section_type
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }

    #[must_use]
    pub fn topics(&self) -> &[TopicResult] {
        &self.topics
    }
}

/// Outcome of one scored submission. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    attempt_id: AttemptId,
    score: u32,
    total_score: Option<u32>,
    percentage: Option<u8>,
    sections: Vec<SectionResult>,
}

impl AttemptResult {
    /// `score` defaults to the sum of correct answers across sections.
    #[must_use]
    pub fn new(
        attempt_id: AttemptId,
        score: Option<u32>,
        total_score: Option<u32>,
        sections: Vec<SectionResult>,
    ) -> Self {
        let score = score.unwrap_or_else(|| sections.iter().map(SectionResult::correct).sum());
        Self {
            attempt_id,
            score,
            total_score,
            percentage: None,
            sections,
        }
    }

    /// Use the scorer's overall percentage instead of the section counts.
    /// Values above 100 are ignored.
    #[must_use]
    pub fn with_percentage(mut self, percentage: Option<u8>) -> Self {
        self.percentage = percentage.filter(|p| *p <= 100);
        self
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn total_score(&self) -> Option<u32> {
        self.total_score
    }

    #[must_use]
    pub fn sections(&self) -> &[SectionResult] {
        &self.sections
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        self.sections.iter().map(SectionResult::correct).sum()
    }

    #[must_use]
    pub fn question_count(&self) -> u32 {
        self.sections.iter().map(SectionResult::total).sum()
    }

    #[must_use]
    pub fn overall_percentage(&self) -> u8 {
        self.percentage
            .unwrap_or_else(|| rounded_percent(self.correct_count(), self.question_count()))
    }
}

/// A finished attempt re-fetched for review: the full test with correct
/// markers, plus what the learner picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptReview {
    attempt_id: AttemptId,
    test: Test,
    selected: AnswerMap,
}

impl AttemptReview {
    /// # Errors
    ///
    /// Returns `AttemptError::UnknownQuestion` if a selection refers to a
    /// question outside `test`.
    pub fn new(attempt_id: AttemptId, test: Test, selected: AnswerMap) -> Result<Self, AttemptError> {
        if let Some((question_id, _)) = selected.iter().find(|(q, _)| test.question(*q).is_none()) {
            return Err(AttemptError::UnknownQuestion(question_id));
        }
        Ok(Self {
            attempt_id,
            test,
            selected,
        })
    }

    #[must_use]
    pub fn attempt_id(&self) -> AttemptId {
        self.attempt_id
    }

    #[must_use]
    pub fn test(&self) -> &Test {
        &self.test
    }

    #[must_use]
    pub fn selected(&self) -> &AnswerMap {
        &self.selected
    }

    /// `None` when the question was unanswered or carries no correct marker.
    #[must_use]
    pub fn is_correct(&self, question_id: QuestionId) -> Option<bool> {
        let correct = self.test.question(question_id)?.correct_choice()?;
        let picked = self.selected.get(question_id)?;
        Some(picked == correct)
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.test
            .questions()
            .filter(|q| self.is_correct(q.id()) == Some(true))
            .count()
    }
}
