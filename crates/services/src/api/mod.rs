//! Backend collaborators of a lesson attempt and their REST implementation.

mod client;
mod config;
mod dto;

use async_trait::async_trait;
use lesson_core::model::{LessonId, LessonResult, Question, QuestionId};

use crate::error::ApiError;

pub use client::LessonApiClient;
pub use config::ApiConfig;

/// Aggregate stats reported to the backend when a lesson is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LessonCompletion {
    pub lesson_id: LessonId,
    pub stars_earned: u8,
    pub questions_completed: u32,
    pub questions_correct: u32,
    pub xp_earned: u32,
}

impl LessonCompletion {
    #[must_use]
    pub fn from_result(lesson_id: LessonId, result: &LessonResult) -> Self {
        Self {
            lesson_id,
            stars_earned: result.stars_earned(),
            questions_completed: result.total_questions(),
            questions_correct: result.score(),
            xp_earned: result.xp_earned(),
        }
    }
}

/// Source of the ordered question set of a lesson.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the questions of a lesson, in order.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the questions cannot be fetched or decoded.
    async fn lesson_questions(&self, lesson_id: LessonId) -> Result<Vec<Question>, ApiError>;
}

/// Records individual answers on the backend.
#[async_trait]
pub trait AnswerRecorder: Send + Sync {
    /// Record the text submitted for a question. Skips send an empty answer.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects or cannot be reached.
    async fn record_answer(&self, question_id: QuestionId, answer: &str) -> Result<(), ApiError>;
}

/// Records finished lessons on the backend.
#[async_trait]
pub trait CompletionRecorder: Send + Sync {
    /// Report a completed lesson.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the backend rejects or cannot be reached.
    async fn complete_lesson(&self, completion: &LessonCompletion) -> Result<(), ApiError>;
}
