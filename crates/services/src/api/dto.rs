//! Wire shapes of the JLPT practice backend and their conversion into
//! validated domain values.

use nihongo_core::model::{
    AnswerMap, AnswerPair, AttemptId, AttemptResult, AttemptReview, AudioClip, Choice, ChoiceId,
    JlptLevel, MediaRef, Question, QuestionId, QuestionPrompt, Section, SectionId, SectionResult,
    SectionType, Test, TestId, TestSummary, TopicResult,
};
use serde::{Deserialize, Serialize};

type ConvertResult<T> = Result<T, nihongo_core::Error>;

//
// ─── TEST LIST ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct TestSummaryDto {
    id: u64,
    title: String,
    level: String,
    duration_minutes: u32,
    #[serde(default)]
    total_score: u32,
    #[serde(default)]
    has_attempted: bool,
    user_best_score: Option<u32>,
    last_attempt_id: Option<u64>,
}

impl TestSummaryDto {
    pub(crate) fn into_summary(self) -> ConvertResult<TestSummary> {
        Ok(TestSummary {
            id: TestId::new(self.id),
            title: self.title,
            level: self.level.parse::<JlptLevel>()?,
            duration_minutes: self.duration_minutes,
            total_score: self.total_score,
            has_attempted: self.has_attempted,
            best_score: self.user_best_score,
            last_attempt_id: self.last_attempt_id.map(AttemptId::new),
        })
    }
}

//
// ─── TEST DETAIL ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct TestDetailDto {
    id: u64,
    title: String,
    level: String,
    duration_minutes: u32,
    #[serde(default)]
    sections: Vec<SectionDto>,
}

impl TestDetailDto {
    pub(crate) fn into_test(self) -> ConvertResult<Test> {
        let sections = self
            .sections
            .into_iter()
            .map(|s| s.into_section().map(|(section, _)| section))
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(Test::new(
            TestId::new(self.id),
            self.title,
            self.level.parse()?,
            self.duration_minutes,
            sections,
        )?)
    }
}

/// Attempt detail: the test with correctness flags and the learner's picks.
#[derive(Debug, Deserialize)]
pub(crate) struct AttemptDetailDto {
    #[serde(alias = "id")]
    attempt_id: u64,
    test_id: u64,
    #[serde(alias = "test_title")]
    title: String,
    #[serde(alias = "test_level")]
    level: String,
    duration_minutes: Option<u32>,
    #[serde(default)]
    sections: Vec<SectionDto>,
}

/// The attempt endpoint omits the test duration; a review never runs a timer.
const REVIEW_DURATION_MINUTES: u32 = 1;

impl AttemptDetailDto {
    pub(crate) fn into_review(self) -> ConvertResult<AttemptReview> {
        let mut sections = Vec::with_capacity(self.sections.len());
        let mut selected = AnswerMap::new();
        for dto in self.sections {
            let (section, picks) = dto.into_section()?;
            for (question_id, choice_id) in picks {
                selected.select(question_id, choice_id);
            }
            sections.push(section);
        }
        let test = Test::new(
            TestId::new(self.test_id),
            self.title,
            self.level.parse()?,
            self.duration_minutes.unwrap_or(REVIEW_DURATION_MINUTES),
            sections,
        )?;
        Ok(AttemptReview::new(
            AttemptId::new(self.attempt_id),
            test,
            selected,
        )?)
    }
}

#[derive(Debug, Deserialize)]
struct SectionDto {
    id: u64,
    section_type: String,
    #[serde(default)]
    title_jp: String,
    #[serde(alias = "title_vi")]
    title_vn: Option<String>,
    #[serde(default)]
    questions: Vec<QuestionDto>,
}

impl SectionDto {
    /// Returns the section plus any learner selections found on its questions.
    fn into_section(self) -> ConvertResult<(Section, Vec<(QuestionId, ChoiceId)>)> {
        let section_type: SectionType = self.section_type.parse()?;
        let mut picks = Vec::new();
        let mut questions = Vec::with_capacity(self.questions.len());
        for dto in self.questions {
            let question_id = QuestionId::new(dto.id);
            if let Some(choice) = dto.user_choice_id {
                picks.push((question_id, ChoiceId::new(choice)));
            }
            questions.push(dto.into_question()?);
        }

        let mut section = Section::new(
            SectionId::new(self.id),
            section_type,
            self.title_jp,
            questions,
        );
        if let Some(title) = self.title_vn {
            section = section.with_title_vi(title);
        }
        Ok((section, picks))
    }
}

#[derive(Debug, Deserialize)]
struct QuestionDto {
    id: u64,
    #[serde(default)]
    question_number: u32,
    sentence: Option<String>,
    underlined_word: Option<String>,
    image_url: Option<String>,
    audio_url: Option<String>,
    duration_seconds: Option<u32>,
    #[serde(default)]
    choices: Vec<ChoiceDto>,
    #[serde(alias = "user_answer_id")]
    user_choice_id: Option<u64>,
}

impl QuestionDto {
    fn into_question(self) -> ConvertResult<Question> {
        let image = non_blank(self.image_url).map(MediaRef::parse).transpose()?;
        let audio = non_blank(self.audio_url)
            .map(MediaRef::parse)
            .transpose()?
            .map(|source| AudioClip::new(source, self.duration_seconds));
        let prompt = QuestionPrompt {
            sentence: non_blank(self.sentence),
            underlined_word: non_blank(self.underlined_word),
            image,
            audio,
        };

        let correct = self
            .choices
            .iter()
            .find(|c| c.is_correct == Some(true))
            .map(|c| ChoiceId::new(c.id));
        let choices = self
            .choices
            .into_iter()
            .map(|c| Choice::new(ChoiceId::new(c.id), c.text))
            .collect();

        Ok(Question::new(
            QuestionId::new(self.id),
            self.question_number,
            prompt,
            choices,
            correct,
        )?)
    }
}

#[derive(Debug, Deserialize)]
struct ChoiceDto {
    id: u64,
    text: String,
    is_correct: Option<bool>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

//
// ─── SUBMISSION ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
pub(crate) struct SubmitRequest {
    answers: Vec<SubmitAnswer>,
}

#[derive(Debug, Serialize)]
struct SubmitAnswer {
    question_id: u64,
    choice_id: u64,
}

impl SubmitRequest {
    pub(crate) fn from_pairs(pairs: &[AnswerPair]) -> Self {
        Self {
            answers: pairs
                .iter()
                .map(|pair| SubmitAnswer {
                    question_id: pair.question_id.value(),
                    choice_id: pair.choice_id.value(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponseDto {
    attempt_id: u64,
    score: Option<u32>,
    total_score: Option<u32>,
    percentage: Option<f64>,
    #[serde(default)]
    sections: Vec<SectionResultDto>,
}

impl SubmitResponseDto {
    pub(crate) fn into_result(self) -> ConvertResult<AttemptResult> {
        let sections = self
            .sections
            .into_iter()
            .map(SectionResultDto::into_result)
            .collect::<ConvertResult<Vec<_>>>()?;
        Ok(AttemptResult::new(
            AttemptId::new(self.attempt_id),
            self.score,
            self.total_score,
            sections,
        )
        .with_percentage(self.percentage.and_then(wire_percent)))
    }
}

#[derive(Debug, Deserialize)]
struct SectionResultDto {
    section_type: Option<String>,
    #[serde(default, alias = "title")]
    title_vn: String,
    correct: u32,
    total: u32,
    percentage: Option<f64>,
    #[serde(default)]
    subsections: Vec<TopicDto>,
}

impl SectionResultDto {
    fn into_result(self) -> ConvertResult<SectionResult> {
        let topics = self
            .subsections
            .into_iter()
            .map(|t| TopicResult::new(t.name, t.correct, t.total))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SectionResult::new(
            self.section_type.and_then(|s| s.parse().ok()),
            self.title_vn,
            self.correct,
            self.total,
            self.percentage.and_then(wire_percent),
            topics,
        )?)
    }
}

#[derive(Debug, Deserialize)]
struct TopicDto {
    name: String,
    correct: u32,
    total: u32,
}

/// Backend percentages may be fractional; out-of-range values are dropped so
/// the domain recomputes them from the counts.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn wire_percent(raw: f64) -> Option<u8> {
    if !raw.is_finite() || !(0.0..=100.0).contains(&raw) {
        return None;
    }
    Some(raw.round() as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_detail_json() -> serde_json::Value {
        json!({
            "id": 3,
            "title": "JLPT N5 模擬試験 1",
            "level": "N5",
            "duration_minutes": 2,
            "sections": [
                {
                    "id": 10,
                    "section_type": "vocabulary",
                    "title_jp": "もじ・ごい",
                    "title_vn": "Từ vựng",
                    "questions": [
                        {
                            "id": 100,
                            "question_number": 1,
                            "sentence": "わたしの へやは ２かいです。",
                            "underlined_word": "へや",
                            "choices": [
                                {"id": 1000, "text": "部屋"},
                                {"id": 1001, "text": "部家"}
                            ]
                        }
                    ]
                },
                {
                    "id": 11,
                    "section_type": "listening",
                    "title_jp": "ちょうかい",
                    "questions": [
                        {
                            "id": 101,
                            "question_number": 1,
                            "audio_url": "/media/n5/l1.mp3",
                            "duration_seconds": 42,
                            "image_url": "",
                            "choices": [{"id": 1010, "text": "1"}]
                        }
                    ]
                }
            ]
        })
    }

    #[test]
    fn test_detail_converts_to_domain() {
        let dto: TestDetailDto = serde_json::from_value(test_detail_json()).unwrap();
        let test = dto.into_test().unwrap();

        assert_eq!(test.id(), TestId::new(3));
        assert_eq!(test.level(), JlptLevel::N5);
        assert_eq!(test.duration_secs(), 120);
        assert_eq!(test.sections().len(), 2);
        assert_eq!(test.sections()[0].title_vi.as_deref(), Some("Từ vựng"));

        let listening = test.question(QuestionId::new(101)).unwrap();
        let audio = listening.prompt().audio.as_ref().unwrap();
        assert_eq!(audio.duration_secs(), Some(42));
        assert!(listening.prompt().image.is_none());
    }

    fn listening_audio(duration: serde_json::Value) -> Option<AudioClip> {
        let mut raw = test_detail_json();
        raw["sections"][1]["questions"][0]["duration_seconds"] = duration;
        let dto: TestDetailDto = serde_json::from_value(raw).unwrap();
        let test = dto.into_test().unwrap();
        test.question(QuestionId::new(101))
            .unwrap()
            .prompt()
            .audio
            .clone()
    }

    #[test]
    fn audio_without_duration_is_kept() {
        let audio = listening_audio(json!(null)).unwrap();
        assert_eq!(audio.source().as_str(), "/media/n5/l1.mp3");
        assert_eq!(audio.duration_secs(), None);
    }

    #[test]
    fn zero_audio_duration_does_not_fail_the_test() {
        let audio = listening_audio(json!(0)).unwrap();
        assert_eq!(audio.source().as_str(), "/media/n5/l1.mp3");
        assert_eq!(audio.duration_secs(), None);
    }

    #[test]
    fn unknown_section_type_is_rejected() {
        let mut raw = test_detail_json();
        raw["sections"][0]["section_type"] = json!("kanji-art");
        let dto: TestDetailDto = serde_json::from_value(raw).unwrap();
        assert!(dto.into_test().is_err());
    }

    #[test]
    fn attempt_detail_keeps_correct_and_selected() {
        let raw = json!({
            "attempt_id": 77,
            "test_id": 3,
            "test_title": "JLPT N5 模擬試験 1",
            "test_level": "n5",
            "score": 0,
            "total_score": 180,
            "sections": [{
                "id": 10,
                "section_type": "grammar",
                "title_jp": "ぶんぽう",
                "questions": [{
                    "id": 100,
                    "question_number": 1,
                    "user_answer_id": 1001,
                    "is_correct": false,
                    "choices": [
                        {"id": 1000, "text": "に", "is_correct": true},
                        {"id": 1001, "text": "で", "is_correct": false}
                    ]
                }]
            }]
        });
        let dto: AttemptDetailDto = serde_json::from_value(raw).unwrap();
        let review = dto.into_review().unwrap();

        assert_eq!(review.attempt_id(), AttemptId::new(77));
        assert_eq!(
            review.selected().get(QuestionId::new(100)),
            Some(ChoiceId::new(1001))
        );
        assert_eq!(review.is_correct(QuestionId::new(100)), Some(false));
    }

    #[test]
    fn submit_request_serializes_pairs() {
        let pairs = [AnswerPair {
            question_id: QuestionId::new(1),
            choice_id: ChoiceId::new(11),
        }];
        let body = serde_json::to_value(SubmitRequest::from_pairs(&pairs)).unwrap();
        assert_eq!(body, json!({"answers": [{"question_id": 1, "choice_id": 11}]}));
    }

    #[test]
    fn submit_response_converts_sections() {
        let raw = json!({
            "attempt_id": 9,
            "sections": [{
                "section_type": "vocabulary",
                "title_vn": "Từ vựng",
                "correct": 2,
                "total": 3,
                "percentage": 66.67,
                "subsections": [{"name": "Kanji", "correct": 1, "total": 2}]
            }]
        });
        let dto: SubmitResponseDto = serde_json::from_value(raw).unwrap();
        let result = dto.into_result().unwrap();

        assert_eq!(result.attempt_id(), AttemptId::new(9));
        assert_eq!(result.score(), 2);
        let section = &result.sections()[0];
        assert_eq!(section.section_type(), Some(SectionType::Vocabulary));
        assert_eq!(section.percentage(), 67);
        assert_eq!(section.topics()[0].percentage(), 50);
        assert_eq!(result.overall_percentage(), 67);
    }

    #[test]
    fn submit_response_keeps_backend_overall_percentage() {
        let raw = json!({
            "attempt_id": 9,
            "score": 60,
            "total_score": 180,
            "percentage": 33,
            "sections": [{
                "section_type": "grammar",
                "title_vn": "Ngữ pháp",
                "correct": 3,
                "total": 4
            }]
        });
        let dto: SubmitResponseDto = serde_json::from_value(raw).unwrap();
        let result = dto.into_result().unwrap();
        assert_eq!(result.overall_percentage(), 33);
        assert_eq!(result.sections()[0].percentage(), 75);
    }

    #[test]
    fn wire_percent_rounds_and_bounds() {
        assert_eq!(wire_percent(66.4), Some(66));
        assert_eq!(wire_percent(99.5), Some(100));
        assert_eq!(wire_percent(0.0), Some(0));
        assert_eq!(wire_percent(140.0), None);
        assert_eq!(wire_percent(f64::NAN), None);
    }

    #[test]
    fn summary_converts_level_and_attempt() {
        let raw = json!({
            "id": 1,
            "title": "Đề 1",
            "level": "N4",
            "duration_minutes": 105,
            "total_score": 180,
            "has_attempted": true,
            "user_best_score": 120,
            "last_attempt_id": 55
        });
        let dto: TestSummaryDto = serde_json::from_value(raw).unwrap();
        let summary = dto.into_summary().unwrap();
        assert_eq!(summary.level, JlptLevel::N4);
        assert_eq!(summary.best_score, Some(120));
        assert_eq!(summary.last_attempt_id, Some(AttemptId::new(55)));
    }
}
