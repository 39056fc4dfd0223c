use std::fmt;

use lesson_core::AnswerDraft;
use lesson_core::matcher::matches;
use lesson_core::model::{
    AnsweredRecord, Feedback, LessonId, LessonResult, Question, QuestionId, SessionSettings,
    SessionState,
};

use super::effects::SessionEffect;
use super::progress::SessionProgress;
use crate::api::LessonCompletion;
use crate::error::{LoadError, RestoreError, TransitionError};

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Where the attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// The current question takes input and can be checked or skipped.
    AwaitingAnswer,
    /// Feedback for the current question is shown; the learner may continue.
    ShowingFeedback,
    /// No hearts left. Only restart or exit are possible.
    HeartsExhausted,
    /// Every question was answered and the result computed.
    Completed,
    /// The learner left the lesson.
    Exited,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// State machine for one lesson attempt.
///
/// Transitions are synchronous and pure: they mutate the attempt and return the effects the
/// caller must carry out. A refused transition returns an error and changes nothing.
pub struct LessonSession {
    lesson_id: LessonId,
    settings: SessionSettings,
    questions: Vec<Question>,
    state: SessionState,
    draft: AnswerDraft,
    hearts_exhausted: bool,
    result: Option<LessonResult>,
    exited: bool,
}

impl LessonSession {
    /// Start a fresh attempt over `questions`.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Empty` if no questions are provided.
    pub fn new(
        lesson_id: LessonId,
        questions: Vec<Question>,
        settings: SessionSettings,
    ) -> Result<Self, LoadError> {
        if questions.is_empty() {
            return Err(LoadError::Empty);
        }
        Ok(Self {
            lesson_id,
            settings,
            questions,
            state: SessionState::fresh(settings.max_hearts()),
            draft: AnswerDraft::new(),
            hearts_exhausted: false,
            result: None,
            exited: false,
        })
    }

    /// Resume from a previously saved state.
    ///
    /// # Errors
    ///
    /// Returns `RestoreError` if `state` does not fit this lesson; the session is left as is.
    pub fn restore(&mut self, state: SessionState) -> Result<(), RestoreError> {
        self.validate_restored(&state)?;
        self.hearts_exhausted = state.hearts() == 0;
        self.state = state;
        self.draft.clear();
        Ok(())
    }

    fn validate_restored(&self, state: &SessionState) -> Result<(), RestoreError> {
        let total = self.questions.len();
        let index = state.current_index();
        if index >= total {
            return Err(RestoreError::IndexOutOfRange { index, total });
        }
        if state.hearts() > self.settings.max_hearts() {
            return Err(RestoreError::TooManyHearts {
                hearts: state.hearts(),
                max: self.settings.max_hearts(),
            });
        }
        for record in state.answered() {
            let position = self
                .questions
                .iter()
                .position(|q| q.id() == record.question_id)
                .ok_or(RestoreError::UnknownQuestion(record.question_id))?;
            if position > index {
                return Err(RestoreError::AnsweredAhead(record.question_id));
            }
        }
        let current = &self.questions[index];
        let record = state.record_for(current.id());
        if record.is_some() != state.is_revealed() {
            return Err(RestoreError::RevealMismatch);
        }
        if let (Some(record), Some(feedback)) = (record, state.feedback()) {
            if feedback.is_correct != record.was_correct
                || feedback.correct_answer != current.correct_answer()
            {
                return Err(RestoreError::FeedbackMismatch(current.id()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson_id
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn draft(&self) -> &AnswerDraft {
        &self.draft
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.score()
    }

    #[must_use]
    pub fn hearts(&self) -> u32 {
        self.state.hearts()
    }

    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.state.feedback()
    }

    #[must_use]
    pub fn result(&self) -> Option<&LessonResult> {
        self.result.as_ref()
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.result.is_some() || self.exited {
            return None;
        }
        self.questions.get(self.state.current_index())
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if self.exited {
            SessionPhase::Exited
        } else if self.result.is_some() {
            SessionPhase::Completed
        } else if self.hearts_exhausted {
            SessionPhase::HeartsExhausted
        } else if self.state.is_revealed() {
            SessionPhase::ShowingFeedback
        } else {
            SessionPhase::AwaitingAnswer
        }
    }

    #[must_use]
    pub fn is_answered(&self, question_id: QuestionId) -> bool {
        self.state.is_answered(question_id)
    }

    #[must_use]
    pub fn is_current_answered(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.state.is_answered(q.id()))
    }

    /// Whether `check` would be accepted right now.
    #[must_use]
    pub fn can_check(&self) -> bool {
        self.phase() == SessionPhase::AwaitingAnswer
            && !self.is_current_answered()
            && self
                .current_question()
                .is_some_and(|q| self.draft.is_submittable(q))
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress::new(
            self.questions.len(),
            self.state.answered_count(),
            self.state.current_index(),
            self.state.is_revealed(),
        )
    }

    //
    // ─── GUARDS ────────────────────────────────────────────────────────────────
    //

    fn ensure_active(&self) -> Result<(), TransitionError> {
        if self.exited {
            return Err(TransitionError::Exited);
        }
        if self.result.is_some() {
            return Err(TransitionError::Completed);
        }
        Ok(())
    }

    /// Current question, provided it still accepts an answer.
    fn open_question(&self) -> Result<&Question, TransitionError> {
        self.ensure_active()?;
        let question = self
            .questions
            .get(self.state.current_index())
            .ok_or(TransitionError::Completed)?;
        if self.state.is_answered(question.id()) {
            return Err(TransitionError::AlreadyAnswered(question.id()));
        }
        if self.hearts_exhausted {
            return Err(TransitionError::HeartsExhausted);
        }
        if self.state.is_revealed() {
            return Err(TransitionError::NotAwaitingAnswer);
        }
        Ok(question)
    }

    //
    // ─── DRAFT EDITS ───────────────────────────────────────────────────────────
    //

    /// Replace the typed answer.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the current question no longer takes input.
    pub fn type_text(&mut self, text: impl Into<String>) -> Result<(), TransitionError> {
        self.open_question()?;
        self.draft.set_text(text);
        Ok(())
    }

    /// Select one of the current question's options.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::UnknownOption` for an option the question does not offer,
    /// or another `TransitionError` if the question no longer takes input.
    pub fn select_option(&mut self, option: impl Into<String>) -> Result<(), TransitionError> {
        let option = option.into();
        let question = self.open_question()?;
        if !question.options().contains(&option) {
            return Err(TransitionError::UnknownOption(option));
        }
        self.draft.select_option(option);
        Ok(())
    }

    /// Pair two items of a match-pairs question.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the current question no longer takes input.
    pub fn pair(
        &mut self,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Result<(), TransitionError> {
        self.open_question()?;
        self.draft.pair(left, right);
        Ok(())
    }

    /// Undo the pair starting at `left`. Returns whether a pair was removed.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the current question no longer takes input.
    pub fn unpair(&mut self, left: &str) -> Result<bool, TransitionError> {
        self.open_question()?;
        Ok(self.draft.unpair(left))
    }

    /// Drop every formed pair.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the current question no longer takes input.
    pub fn clear_pairs(&mut self) -> Result<(), TransitionError> {
        self.open_question()?;
        self.draft.clear_pairs();
        Ok(())
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    /// Check the draft against the current question.
    ///
    /// A wrong answer costs one heart; losing the last heart exhausts the attempt.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::AlreadyAnswered` on a repeated submission,
    /// `TransitionError::NothingToSubmit` when the draft is not submittable, or another
    /// `TransitionError` when the attempt is not awaiting an answer.
    pub fn check(&mut self) -> Result<Vec<SessionEffect>, TransitionError> {
        let question = self.open_question()?;
        if !self.draft.is_submittable(question) {
            return Err(TransitionError::NothingToSubmit);
        }

        let question_id = question.id();
        let answer = self.draft.submission(question);
        let is_correct = matches(&answer, question.correct_answer());
        let record = AnsweredRecord::for_question(question, is_correct);

        self.state
            .record(record)
            .map_err(|_| TransitionError::AlreadyAnswered(question_id))?;
        if !is_correct && self.state.lose_heart() == 0 {
            self.hearts_exhausted = true;
        }

        tracing::debug!(
            lesson_id = %self.lesson_id,
            %question_id,
            is_correct,
            hearts = self.state.hearts(),
            "answer checked"
        );

        Ok(vec![
            SessionEffect::RecordAnswer {
                question_id,
                answer,
            },
            SessionEffect::PersistSnapshot,
        ])
    }

    /// Give up on the current question without losing a heart.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::AlreadyAnswered` if the question was already answered, or
    /// another `TransitionError` when the attempt is not awaiting an answer.
    pub fn skip(&mut self) -> Result<Vec<SessionEffect>, TransitionError> {
        let question = self.open_question()?;
        let question_id = question.id();
        let record = AnsweredRecord::for_question(question, false);

        self.state
            .record(record)
            .map_err(|_| TransitionError::AlreadyAnswered(question_id))?;

        tracing::debug!(lesson_id = %self.lesson_id, %question_id, "question skipped");

        Ok(vec![
            SessionEffect::RecordAnswer {
                question_id,
                answer: String::new(),
            },
            SessionEffect::PersistSnapshot,
        ])
    }

    /// Leave the feedback screen: next question, or finish the lesson after the last one.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::HeartsExhausted` when no hearts are left,
    /// `TransitionError::NotShowingFeedback` when there is no feedback to dismiss, or another
    /// `TransitionError` once the attempt has ended.
    pub fn continue_lesson(&mut self) -> Result<Vec<SessionEffect>, TransitionError> {
        self.ensure_active()?;
        if self.state.hearts() == 0 {
            self.hearts_exhausted = true;
            return Err(TransitionError::HeartsExhausted);
        }
        if !self.state.is_revealed() {
            return Err(TransitionError::NotShowingFeedback);
        }

        if self.state.current_index() + 1 < self.questions.len() {
            self.state.advance();
            self.draft.clear();
            return Ok(vec![SessionEffect::PersistSnapshot]);
        }

        let total = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        let result = LessonResult::compute(self.state.score(), total, self.settings.xp_per_correct());
        self.result = Some(result);

        tracing::info!(
            lesson_id = %self.lesson_id,
            score = result.score(),
            total = result.total_questions(),
            stars = result.stars_earned(),
            "lesson completed"
        );

        Ok(vec![
            SessionEffect::CompleteLesson(LessonCompletion::from_result(self.lesson_id, &result)),
            SessionEffect::ClearSnapshot,
            SessionEffect::ShowResults(result),
        ])
    }

    /// Throw the attempt away and start again from the first question.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Completed` or `TransitionError::Exited` once the attempt
    /// has ended.
    pub fn restart(&mut self) -> Result<Vec<SessionEffect>, TransitionError> {
        self.ensure_active()?;
        self.state.reset(self.settings.max_hearts());
        self.draft.clear();
        self.hearts_exhausted = false;

        tracing::info!(lesson_id = %self.lesson_id, "lesson attempt restarted");
        Ok(vec![SessionEffect::ClearSnapshot, SessionEffect::PersistSnapshot])
    }

    /// Abandon the attempt. No completion is reported.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError::Exited` if the attempt was already abandoned.
    pub fn exit(&mut self) -> Result<Vec<SessionEffect>, TransitionError> {
        if self.exited {
            return Err(TransitionError::Exited);
        }
        self.exited = true;

        tracing::info!(lesson_id = %self.lesson_id, "lesson attempt abandoned");
        Ok(vec![SessionEffect::ClearSnapshot])
    }
}

impl fmt::Debug for LessonSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LessonSession")
            .field("lesson_id", &self.lesson_id)
            .field("questions_len", &self.questions.len())
            .field("current", &self.state.current_index())
            .field("score", &self.state.score())
            .field("hearts", &self.state.hearts())
            .field("answered_len", &self.state.answered_count())
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
