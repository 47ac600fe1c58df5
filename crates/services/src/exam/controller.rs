use std::sync::Arc;

use nihongo_core::model::{
    AnswerMap, AttemptResult, ChoiceId, QuestionId, Section, SectionType, Test, TestId,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::api::ExamApi;
use crate::error::ExamError;
use crate::exam::config::ExamConfig;
use crate::exam::state::ExamPhase;
use crate::exam::timer::Countdown;

//
// ─── VIEW CONTRACT ─────────────────────────────────────────────────────────────
//

/// User-facing message raised by the controller, drained with
/// `take_notices`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamNotice {
    /// Remaining time dropped below the warning threshold.
    LowTime { remaining_secs: u32 },
    /// The countdown hit zero; the attempt is being submitted.
    TimeExpired,
    /// Submission failed; answers are kept and `submit` may be retried.
    SubmissionFailed,
}

/// What to ask before a manual submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitPrompt {
    Unanswered { count: usize },
    FinalCheck,
}

/// Forward action offered at the focused section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardAction {
    Next,
    Submit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionNavigation {
    pub index: usize,
    pub count: usize,
    pub has_previous: bool,
    pub forward: ForwardAction,
}

/// Result of one `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not in progress or the timer is stopped.
    Ignored,
    Counting { remaining_secs: u32 },
    /// Time ran out. Answers are locked and `auto_submit` should follow
    /// once the `TimeExpired` notice has been shown.
    Expired,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Drives one timed attempt at a mock test.
///
/// Every async operation takes `&mut self`, so a fetch and a submission can
/// never overlap and no answer can change while a submission is in flight.
pub struct ExamSessionController {
    api: Arc<dyn ExamApi>,
    config: ExamConfig,
    phase: ExamPhase,
    test: Option<Test>,
    answers: AnswerMap,
    focused: Option<usize>,
    countdown: Countdown,
    low_time_warned: bool,
    result: Option<AttemptResult>,
    notices: Vec<ExamNotice>,
}

impl ExamSessionController {
    #[must_use]
    pub fn new(api: Arc<dyn ExamApi>, config: ExamConfig) -> Self {
        Self {
            api,
            config,
            phase: ExamPhase::Idle,
            test: None,
            answers: AnswerMap::new(),
            focused: None,
            countdown: Countdown::default(),
            low_time_warned: false,
            result: None,
            notices: Vec::new(),
        }
    }

    /// Fetch the test and enter `Ready` with the timer running.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::Load` if the test cannot be fetched (the session is
    /// then `LoadFailed`), or `ExamError::InvalidTransition` if the session
    /// was already started.
    pub async fn start(&mut self, test_id: TestId) -> Result<(), ExamError> {
        self.transition(ExamPhase::Loading)?;

        match self.api.fetch_test(test_id).await {
            Ok(test) => {
                let test = test.redacted();
                info!(
                    %test_id,
                    level = %test.level(),
                    sections = test.sections().len(),
                    questions = test.question_count(),
                    "exam loaded"
                );
                self.countdown = Countdown::new(test.duration_secs());
                self.focused = (!test.sections().is_empty()).then_some(0);
                self.test = Some(test);
                self.transition(ExamPhase::Ready)?;
                self.start_timer();
                Ok(())
            }
            Err(err) => {
                warn!(%test_id, error = %err, "exam failed to load");
                self.transition(ExamPhase::LoadFailed)?;
                Err(ExamError::Load(err))
            }
        }
    }

    /// Record or overwrite the answer to a question.
    ///
    /// Returns the previously selected choice, if any.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::AnswersLocked` outside `Ready`, or
    /// `UnknownQuestion`/`UnknownChoice` when the ids are not part of the test.
    pub fn select_answer(
        &mut self,
        question_id: QuestionId,
        choice_id: ChoiceId,
    ) -> Result<Option<ChoiceId>, ExamError> {
        if self.phase != ExamPhase::Ready || self.countdown.is_expired() {
            return Err(ExamError::AnswersLocked);
        }
        let test = self.test.as_ref().ok_or(ExamError::AnswersLocked)?;
        let question = test
            .question(question_id)
            .ok_or(ExamError::UnknownQuestion(question_id))?;
        if !question.has_choice(choice_id) {
            return Err(ExamError::UnknownChoice {
                question: question_id,
                choice: choice_id,
            });
        }
        Ok(self.answers.select(question_id, choice_id))
    }

    //
    // ─── SECTIONS ──────────────────────────────────────────────────────────────
    //

    /// Show the section of the given type.
    ///
    /// # Errors
    ///
    /// Returns `ExamError::UnknownSection` if the loaded test has no such
    /// section.
    pub fn focus_section(&mut self, section_type: SectionType) -> Result<&Section, ExamError> {
        let test = self
            .test
            .as_ref()
            .ok_or(ExamError::UnknownSection(section_type))?;
        let index = test
            .section_index(section_type)
            .ok_or(ExamError::UnknownSection(section_type))?;
        self.focused = Some(index);
        Ok(&test.sections()[index])
    }

    /// Move to the following section. Returns `false` at the last one.
    pub fn focus_next(&mut self) -> bool {
        let count = self.section_count();
        match self.focused {
            Some(index) if index + 1 < count => {
                self.focused = Some(index + 1);
                true
            }
            _ => false,
        }
    }

    /// Move to the preceding section. Returns `false` at the first one.
    pub fn focus_previous(&mut self) -> bool {
        match self.focused {
            Some(index) if index > 0 => {
                self.focused = Some(index - 1);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn focused_section(&self) -> Option<&Section> {
        let test = self.test.as_ref()?;
        test.sections().get(self.focused?)
    }

    /// Navigation controls for the focused section; `None` without sections.
    #[must_use]
    pub fn section_navigation(&self) -> Option<SectionNavigation> {
        let index = self.focused?;
        let count = self.section_count();
        Some(SectionNavigation {
            index,
            count,
            has_previous: index > 0,
            forward: if index + 1 >= count {
                ForwardAction::Submit
            } else {
                ForwardAction::Next
            },
        })
    }

    fn section_count(&self) -> usize {
        self.test.as_ref().map_or(0, |t| t.sections().len())
    }

    //
    // ─── TIMER ─────────────────────────────────────────────────────────────────
    //

    /// Advance the countdown by one second.
    ///
    /// At zero the timer stops, a `TimeExpired` notice is raised and
    /// `TickOutcome::Expired` is returned. Nothing is sent yet: the host shows
    /// the notice, then calls `auto_submit`.
    pub fn tick(&mut self) -> TickOutcome {
        if self.phase != ExamPhase::Ready {
            return TickOutcome::Ignored;
        }
        let Some(remaining_secs) = self.countdown.tick() else {
            return TickOutcome::Ignored;
        };

        if remaining_secs == 0 {
            info!("exam time expired");
            self.notices.push(ExamNotice::TimeExpired);
            return TickOutcome::Expired;
        }

        if !self.low_time_warned && remaining_secs < self.config.low_time_threshold_secs {
            self.low_time_warned = true;
            self.notices.push(ExamNotice::LowTime { remaining_secs });
        }
        TickOutcome::Counting { remaining_secs }
    }

    /// Resume the countdown. No effect outside `Ready` or once time is up.
    pub fn start_timer(&mut self) {
        if self.phase == ExamPhase::Ready {
            self.countdown.start();
        }
    }

    pub fn stop_timer(&mut self) {
        self.countdown.stop();
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    //
    // ─── SUBMISSION ────────────────────────────────────────────────────────────
    //

    /// Which confirmation to show before a manual submission.
    #[must_use]
    pub fn confirmation_prompt(&self) -> SubmitPrompt {
        let count = self
            .test
            .as_ref()
            .map_or(0, |test| self.answers.unanswered_in(test));
        if count > 0 {
            SubmitPrompt::Unanswered { count }
        } else {
            SubmitPrompt::FinalCheck
        }
    }

    /// Submit the recorded answers after the learner confirmed.
    ///
    /// On failure the session returns to `Ready` with answers intact, a
    /// `SubmissionFailed` notice is raised and the call may be repeated.
    ///
    /// # Errors
    ///
    /// Returns `NotConfirmed` without confirmation, `AlreadySubmitted` after a
    /// successful submission, `InvalidTransition` outside `Ready`, and a
    /// retriable `Submission`/`SubmissionTimedOut` error on failure.
    pub async fn submit(&mut self, confirmed: bool) -> Result<(), ExamError> {
        match self.phase {
            ExamPhase::Ready => {}
            ExamPhase::Submitted => return Err(ExamError::AlreadySubmitted),
            from => {
                return Err(ExamError::InvalidTransition {
                    from,
                    to: ExamPhase::Submitting,
                });
            }
        }
        if !confirmed {
            return Err(ExamError::NotConfirmed);
        }
        self.send_submission().await
    }

    /// Submit without confirmation once the countdown has run out.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` while time remains or outside `Ready`, and
    /// a retriable `Submission`/`SubmissionTimedOut` error on failure.
    pub async fn auto_submit(&mut self) -> Result<(), ExamError> {
        if self.phase != ExamPhase::Ready || !self.countdown.is_expired() {
            return Err(ExamError::InvalidTransition {
                from: self.phase,
                to: ExamPhase::Submitting,
            });
        }
        info!("submitting on expiry");
        self.send_submission().await
    }

    async fn send_submission(&mut self) -> Result<(), ExamError> {
        let test_id = self
            .test
            .as_ref()
            .map(Test::id)
            .ok_or(ExamError::InvalidTransition {
                from: self.phase,
                to: ExamPhase::Submitting,
            })?;
        self.transition(ExamPhase::Submitting)?;
        self.countdown.stop();

        let payload = self.answers.to_submission();
        info!(%test_id, answered = payload.len(), "submitting attempt");

        let limit = self.config.submit_timeout;
        let outcome = match timeout(limit, self.api.submit(test_id, &payload)).await {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(err)) => Err(ExamError::Submission(err)),
            Err(_) => Err(ExamError::SubmissionTimedOut(limit)),
        };

        match outcome {
            Ok(result) => {
                info!(
                    %test_id,
                    attempt_id = %result.attempt_id(),
                    score = result.score(),
                    "attempt submitted"
                );
                self.transition(ExamPhase::Submitted)?;
                self.answers.clear();
                self.result = Some(result);
                Ok(())
            }
            Err(err) => {
                warn!(%test_id, error = %err, "submission failed");
                self.transition(ExamPhase::Ready)?;
                self.notices.push(ExamNotice::SubmissionFailed);
                self.start_timer();
                Err(err)
            }
        }
    }

    //
    // ─── LIFECYCLE ─────────────────────────────────────────────────────────────
    //

    /// Leave the exam: stop the timer and drop unsent answers.
    ///
    /// A submitted session keeps its result and phase.
    pub fn abandon(&mut self) {
        self.countdown.stop();
        self.answers.clear();
        if self.phase.is_terminal() {
            debug!(phase = %self.phase, "exam already finished");
            return;
        }
        if self.phase.can_transition_to(ExamPhase::Abandoned) {
            debug!(from = %self.phase, "exam abandoned");
            self.phase = ExamPhase::Abandoned;
        }
    }

    /// Drain pending notices in the order they were raised.
    pub fn take_notices(&mut self) -> Vec<ExamNotice> {
        std::mem::take(&mut self.notices)
    }

    fn transition(&mut self, to: ExamPhase) -> Result<(), ExamError> {
        if !self.phase.can_transition_to(to) {
            return Err(ExamError::InvalidTransition {
                from: self.phase,
                to,
            });
        }
        debug!(from = %self.phase, %to, "exam phase change");
        self.phase = to;
        Ok(())
    }

    //
    // ─── ACCESSORS ─────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn phase(&self) -> ExamPhase {
        self.phase
    }

    /// The loaded test, without correct-choice markers.
    #[must_use]
    pub fn test(&self) -> Option<&Test> {
        self.test.as_ref()
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn result(&self) -> Option<&AttemptResult> {
        self.result.as_ref()
    }
}
