use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;
use crate::model::question::Question;

/// Outcome recorded for a question the learner checked or skipped.
///
/// Created once per question per attempt; the question cannot be answered again afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnsweredRecord {
    pub question_id: QuestionId,
    pub was_correct: bool,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}

impl AnsweredRecord {
    #[must_use]
    pub fn for_question(question: &Question, was_correct: bool) -> Self {
        Self {
            question_id: question.id(),
            was_correct,
            correct_answer: question.correct_answer().to_owned(),
            explanation: question.explanation().unwrap_or_default().to_owned(),
        }
    }

    /// Feedback payload shown for this record.
    #[must_use]
    pub fn feedback(&self) -> Feedback {
        Feedback {
            is_correct: self.was_correct,
            correct_answer: self.correct_answer.clone(),
            explanation: self.explanation.clone(),
        }
    }
}

/// What the learner sees after checking or skipping a question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub correct_answer: String,
    pub explanation: String,
}
