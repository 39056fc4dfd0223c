use std::sync::Arc;

use lesson_core::model::{LessonResult, QuestionId};
use tokio::task::JoinHandle;

use crate::api::{AnswerRecorder, CompletionRecorder, LessonCompletion};

/// Outbound command produced by a session transition.
///
/// The session never performs I/O; the workflow executes these in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEffect {
    /// Overwrite the lesson snapshot with the current state.
    PersistSnapshot,
    /// Delete the lesson snapshot.
    ClearSnapshot,
    /// Tell the backend what was submitted. Empty for skips.
    RecordAnswer {
        question_id: QuestionId,
        answer: String,
    },
    /// Tell the backend the lesson is done.
    CompleteLesson(LessonCompletion),
    /// Hand the final result to the results screen.
    ShowResults(LessonResult),
}

/// Runs backend notifications as detached tasks.
///
/// Failures are logged and dropped; nothing is retried and local state is never rolled back.
#[derive(Clone)]
pub struct EffectDispatcher {
    answers: Arc<dyn AnswerRecorder>,
    completions: Arc<dyn CompletionRecorder>,
}

impl EffectDispatcher {
    #[must_use]
    pub fn new(answers: Arc<dyn AnswerRecorder>, completions: Arc<dyn CompletionRecorder>) -> Self {
        Self {
            answers,
            completions,
        }
    }

    /// Spawn the answer notification. Must be called within a tokio runtime.
    pub fn record_answer(&self, question_id: QuestionId, answer: String) -> JoinHandle<()> {
        let answers = Arc::clone(&self.answers);
        tokio::spawn(async move {
            if let Err(err) = answers.record_answer(question_id, &answer).await {
                tracing::warn!(%question_id, error = %err, "failed to record answer");
            }
        })
    }

    /// Spawn the completion notification. Must be called within a tokio runtime.
    pub fn complete_lesson(&self, completion: LessonCompletion) -> JoinHandle<()> {
        let completions = Arc::clone(&self.completions);
        tokio::spawn(async move {
            match completions.complete_lesson(&completion).await {
                Ok(()) => tracing::debug!(lesson_id = %completion.lesson_id, "lesson completion recorded"),
                Err(err) => tracing::warn!(
                    lesson_id = %completion.lesson_id,
                    error = %err,
                    "failed to record lesson completion"
                ),
            }
        })
    }
}
