use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{AttemptId, ChoiceId, QuestionId, SectionId, TestId};
use crate::model::media::{AudioClip, MediaRef};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TestError {
    #[error("test title cannot be empty")]
    EmptyTitle,

    #[error("test duration must be > 0 minutes")]
    InvalidDuration,

    #[error("question {0} appears more than once in the test")]
    DuplicateQuestion(QuestionId),

    #[error("choice {choice} appears more than once in question {question}")]
    DuplicateChoice {
        question: QuestionId,
        choice: ChoiceId,
    },

    #[error("correct choice {choice} is not one of the choices of question {question}")]
    UnknownCorrectChoice {
        question: QuestionId,
        choice: ChoiceId,
    },

    #[error("unknown JLPT level: {0}")]
    UnknownLevel(String),

    #[error("unknown section type: {0}")]
    UnknownSectionType(String),
}

//
// ─── LEVEL & SECTION TYPE ──────────────────────────────────────────────────────
//

/// JLPT proficiency level, from beginner (N5) to advanced (N1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JlptLevel {
    #[default]
    N5,
    N4,
    N3,
    N2,
    N1,
}

impl JlptLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            JlptLevel::N5 => "N5",
            JlptLevel::N4 => "N4",
            JlptLevel::N3 => "N3",
            JlptLevel::N2 => "N2",
            JlptLevel::N1 => "N1",
        }
    }
}

impl fmt::Display for JlptLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JlptLevel {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "N5" => Ok(JlptLevel::N5),
            "N4" => Ok(JlptLevel::N4),
            "N3" => Ok(JlptLevel::N3),
            "N2" => Ok(JlptLevel::N2),
            "N1" => Ok(JlptLevel::N1),
            _ => Err(TestError::UnknownLevel(s.to_owned())),
        }
    }
}

/// Thematic grouping of questions within a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Vocabulary,
    Grammar,
    Reading,
    Listening,
}

impl SectionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SectionType::Vocabulary => "vocabulary",
            SectionType::Grammar => "grammar",
            SectionType::Reading => "reading",
            SectionType::Listening => "listening",
        }
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionType {
    type Err = TestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vocabulary" => Ok(SectionType::Vocabulary),
            "grammar" => Ok(SectionType::Grammar),
            "reading" => Ok(SectionType::Reading),
            "listening" => Ok(SectionType::Listening),
            _ => Err(TestError::UnknownSectionType(s.to_owned())),
        }
    }
}

//
// ─── QUESTIONS ─────────────────────────────────────────────────────────────────
//

/// A selectable answer. Correctness is never stored on the choice itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub id: ChoiceId,
    pub text: String,
}

impl Choice {
    #[must_use]
    pub fn new(id: ChoiceId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }
}

/// What the learner is shown for a question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuestionPrompt {
    pub sentence: Option<String>,
    /// Word inside `sentence` that the question is about.
    pub underlined_word: Option<String>,
    pub image: Option<MediaRef>,
    pub audio: Option<AudioClip>,
}

impl QuestionPrompt {
    #[must_use]
    pub fn sentence(sentence: impl Into<String>) -> Self {
        Self {
            sentence: Some(sentence.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    number: u32,
    prompt: QuestionPrompt,
    choices: Vec<Choice>,
    correct_choice: Option<ChoiceId>,
}

impl Question {
    /// Build a question, checking that choices are unique and that the
    /// correct-choice marker (review contexts only) names one of them.
    ///
    /// # Errors
    ///
    /// Returns `TestError::DuplicateChoice` or `TestError::UnknownCorrectChoice`.
    pub fn new(
        id: QuestionId,
        number: u32,
        prompt: QuestionPrompt,
        choices: Vec<Choice>,
        correct_choice: Option<ChoiceId>,
    ) -> Result<Self, TestError> {
        let mut seen = HashSet::with_capacity(choices.len());
        for choice in &choices {
            if !seen.insert(choice.id) {
                return Err(TestError::DuplicateChoice {
                    question: id,
                    choice: choice.id,
                });
            }
        }
        if let Some(correct) = correct_choice {
            if !seen.contains(&correct) {
                return Err(TestError::UnknownCorrectChoice {
                    question: id,
                    choice: correct,
                });
            }
        }

        Ok(Self {
            id,
            number,
            prompt,
            choices,
            correct_choice,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    /// Ordinal shown to the learner ("Câu 3").
    #[must_use]
    pub fn number(&self) -> u32 {
        self.number
    }

    #[must_use]
    pub fn prompt(&self) -> &QuestionPrompt {
        &self.prompt
    }

    #[must_use]
    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    #[must_use]
    pub fn has_choice(&self, choice_id: ChoiceId) -> bool {
        self.choices.iter().any(|c| c.id == choice_id)
    }

    /// Only populated for review; always `None` during a live attempt.
    #[must_use]
    pub fn correct_choice(&self) -> Option<ChoiceId> {
        self.correct_choice
    }
}

//
// ─── SECTIONS & TESTS ──────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: SectionId,
    pub section_type: SectionType,
    pub title_jp: String,
    pub title_vi: Option<String>,
    pub questions: Vec<Question>,
}

impl Section {
    #[must_use]
    pub fn new(
        id: SectionId,
        section_type: SectionType,
        title_jp: impl Into<String>,
        questions: Vec<Question>,
    ) -> Self {
        Self {
            id,
            section_type,
            title_jp: title_jp.into(),
            title_vi: None,
            questions,
        }
    }

    #[must_use]
    pub fn with_title_vi(mut self, title: impl Into<String>) -> Self {
        self.title_vi = Some(title.into());
        self
    }
}

/// A timed, multi-section JLPT mock test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Test {
    id: TestId,
    title: String,
    level: JlptLevel,
    duration_minutes: u32,
    sections: Vec<Section>,
}

impl Test {
    /// Build a test.
    ///
    /// A test without sections (or with empty sections) is valid; views render
    /// an empty state for it.
    ///
    /// # Errors
    ///
    /// Returns `TestError` when the title is blank, the duration is zero, or a
    /// question id repeats across sections.
    pub fn new(
        id: TestId,
        title: impl Into<String>,
        level: JlptLevel,
        duration_minutes: u32,
        sections: Vec<Section>,
    ) -> Result<Self, TestError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(TestError::EmptyTitle);
        }
        if duration_minutes == 0 {
            return Err(TestError::InvalidDuration);
        }

        let mut seen = HashSet::new();
        for question in sections.iter().flat_map(|s| s.questions.iter()) {
            if !seen.insert(question.id) {
                return Err(TestError::DuplicateQuestion(question.id));
            }
        }

        Ok(Self {
            id,
            title,
            level,
            duration_minutes,
            sections,
        })
    }

    /// Drop every correct-choice marker so the test is safe to show during a
    /// live attempt.
    #[must_use]
    pub fn redacted(mut self) -> Self {
        for question in self.sections.iter_mut().flat_map(|s| s.questions.iter_mut()) {
            question.correct_choice = None;
        }
        self
    }

    #[must_use]
    pub fn id(&self) -> TestId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn level(&self) -> JlptLevel {
        self.level
    }

    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        self.duration_minutes
    }

    /// Total time allowed for the attempt, in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_minutes.saturating_mul(60)
    }

    #[must_use]
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Index of the first section of the given type.
    #[must_use]
    pub fn section_index(&self, section_type: SectionType) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.section_type == section_type)
    }

    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.sections.iter().flat_map(|s| s.questions.iter())
    }

    #[must_use]
    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions().find(|q| q.id == id)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }
}

/// Entry in the per-level test list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestSummary {
    pub id: TestId,
    pub title: String,
    pub level: JlptLevel,
    pub duration_minutes: u32,
    pub total_score: u32,
    pub has_attempted: bool,
    pub best_score: Option<u32>,
    pub last_attempt_id: Option<AttemptId>,
}
