use std::sync::{Arc, Mutex, PoisonError};

use lesson_core::Clock;
use lesson_core::model::{LessonId, LessonResult, SessionSettings};
use storage::repository::SnapshotSlot;
use tokio::task::JoinHandle;

use super::effects::{EffectDispatcher, SessionEffect};
use super::engine::{LessonSession, SessionPhase};
use super::store::SessionStateStore;
use crate::api::{AnswerRecorder, CompletionRecorder, QuestionSource};
use crate::error::{LoadError, TransitionError};

/// Learner action routed through [`LessonSessionLoop::apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIntent {
    TypeText(String),
    SelectOption(String),
    Pair { left: String, right: String },
    Unpair(String),
    ClearPairs,
    Check,
    Skip,
    Continue,
    Restart,
    Exit,
}

/// What the screen should show after a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Updated(SessionPhase),
    Completed(LessonResult),
    Exited,
}

/// Orchestrates lesson start, resume and effect execution.
#[derive(Clone)]
pub struct LessonSessionLoop {
    clock: Clock,
    settings: SessionSettings,
    questions: Arc<dyn QuestionSource>,
    snapshots: Arc<dyn SnapshotSlot>,
    store: SessionStateStore,
    dispatcher: EffectDispatcher,
    notifications: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl LessonSessionLoop {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionSource>,
        answers: Arc<dyn AnswerRecorder>,
        completions: Arc<dyn CompletionRecorder>,
        snapshots: Arc<dyn SnapshotSlot>,
    ) -> Self {
        let settings = SessionSettings::default();
        Self {
            clock,
            settings,
            questions,
            store: SessionStateStore::new(
                clock,
                Arc::clone(&snapshots),
                settings.staleness_window(),
            ),
            snapshots,
            dispatcher: EffectDispatcher::new(answers, completions),
            notifications: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self.store = SessionStateStore::new(
            self.clock,
            Arc::clone(&self.snapshots),
            settings.staleness_window(),
        );
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    #[must_use]
    pub fn store(&self) -> &SessionStateStore {
        &self.store
    }

    /// Load the lesson and resume a fresh-enough snapshot if one exists.
    ///
    /// A snapshot that does not fit the loaded questions is discarded.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if no lesson is selected, the id is malformed, the questions
    /// cannot be fetched, or the lesson has no questions.
    pub async fn start(&self, lesson_id: Option<&str>) -> Result<LessonSession, LoadError> {
        let raw = lesson_id
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or(LoadError::NoLessonSelected)?;
        let lesson_id: LessonId = raw.parse()?;

        let questions = self.questions.lesson_questions(lesson_id).await?;
        let mut session = LessonSession::new(lesson_id, questions, self.settings)?;

        match self.store.load(lesson_id).await {
            Some(saved) => match session.restore(saved) {
                Ok(()) => tracing::info!(
                    %lesson_id,
                    index = session.state().current_index(),
                    answered = session.state().answered_count(),
                    hearts = session.hearts(),
                    "resumed lesson attempt"
                ),
                Err(err) => {
                    tracing::warn!(%lesson_id, error = %err, "discarding mismatched session snapshot");
                    self.store.clear(lesson_id).await;
                }
            },
            None => tracing::info!(
                %lesson_id,
                questions = session.total_questions(),
                "started lesson attempt"
            ),
        }

        Ok(session)
    }

    /// Apply one learner action and carry out the effects it produced, in order.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` if the session refuses the action; nothing is executed then.
    pub async fn apply(
        &self,
        session: &mut LessonSession,
        intent: SessionIntent,
    ) -> Result<StepOutcome, TransitionError> {
        tracing::debug!(lesson_id = %session.lesson_id(), ?intent, "applying session intent");

        let effects = match intent {
            SessionIntent::TypeText(text) => {
                session.type_text(text)?;
                Vec::new()
            }
            SessionIntent::SelectOption(option) => {
                session.select_option(option)?;
                Vec::new()
            }
            SessionIntent::Pair { left, right } => {
                session.pair(left, right)?;
                Vec::new()
            }
            SessionIntent::Unpair(left) => {
                session.unpair(&left)?;
                Vec::new()
            }
            SessionIntent::ClearPairs => {
                session.clear_pairs()?;
                Vec::new()
            }
            SessionIntent::Check => session.check()?,
            SessionIntent::Skip => session.skip()?,
            SessionIntent::Continue => session.continue_lesson()?,
            SessionIntent::Restart => session.restart()?,
            SessionIntent::Exit => session.exit()?,
        };

        let completed = self.run_effects(session, effects).await;
        Ok(match (completed, session.phase()) {
            (_, SessionPhase::Exited) => StepOutcome::Exited,
            (Some(result), _) => StepOutcome::Completed(result),
            (None, phase) => StepOutcome::Updated(phase),
        })
    }

    /// Check the current draft.
    ///
    /// # Errors
    ///
    /// See [`LessonSession::check`].
    pub async fn check(&self, session: &mut LessonSession) -> Result<StepOutcome, TransitionError> {
        self.apply(session, SessionIntent::Check).await
    }

    /// Skip the current question.
    ///
    /// # Errors
    ///
    /// See [`LessonSession::skip`].
    pub async fn skip(&self, session: &mut LessonSession) -> Result<StepOutcome, TransitionError> {
        self.apply(session, SessionIntent::Skip).await
    }

    /// Dismiss feedback and move on.
    ///
    /// # Errors
    ///
    /// See [`LessonSession::continue_lesson`].
    pub async fn continue_lesson(
        &self,
        session: &mut LessonSession,
    ) -> Result<StepOutcome, TransitionError> {
        self.apply(session, SessionIntent::Continue).await
    }

    /// Start the attempt over.
    ///
    /// # Errors
    ///
    /// See [`LessonSession::restart`].
    pub async fn restart(&self, session: &mut LessonSession) -> Result<StepOutcome, TransitionError> {
        self.apply(session, SessionIntent::Restart).await
    }

    /// Abandon the attempt and drop it.
    ///
    /// # Errors
    ///
    /// See [`LessonSession::exit`].
    pub async fn exit(&self, mut session: LessonSession) -> Result<(), TransitionError> {
        self.apply(&mut session, SessionIntent::Exit).await?;
        Ok(())
    }

    /// Wait for every backend notification spawned so far.
    pub async fn flush_notifications(&self) {
        let pending = std::mem::take(
            &mut *self
                .notifications
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for handle in pending {
            if let Err(err) = handle.await {
                tracing::warn!(error = %err, "backend notification task failed");
            }
        }
    }

    async fn run_effects(
        &self,
        session: &LessonSession,
        effects: Vec<SessionEffect>,
    ) -> Option<LessonResult> {
        let lesson_id = session.lesson_id();
        let mut completed = None;
        for effect in effects {
            match effect {
                SessionEffect::PersistSnapshot => self.store.save(lesson_id, session.state()).await,
                SessionEffect::ClearSnapshot => self.store.clear(lesson_id).await,
                SessionEffect::RecordAnswer {
                    question_id,
                    answer,
                } => self.track(self.dispatcher.record_answer(question_id, answer)),
                SessionEffect::CompleteLesson(completion) => {
                    self.track(self.dispatcher.complete_lesson(completion));
                }
                SessionEffect::ShowResults(result) => completed = Some(result),
            }
        }
        completed
    }

    fn track(&self, handle: JoinHandle<()>) {
        let mut pending = self
            .notifications
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);
    }
}
