use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answered::{AnsweredRecord, Feedback};
use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Violations of the session state invariants.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StateError {
    #[error("question {0} already has an answer in this attempt")]
    DuplicateAnswer(QuestionId),

    #[error("{answered} answers recorded but current index is only {index}")]
    HistoryAheadOfIndex { answered: usize, index: usize },

    #[error("score {score} exceeds {correct} correct answers")]
    ScoreExceedsCorrect { score: u32, correct: u32 },
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// Mutable state of one lesson attempt.
///
/// `answered` is the append-only log; `answered_index` is derived from it and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PersistedSessionState", into = "PersistedSessionState")]
pub struct SessionState {
    current_index: usize,
    score: u32,
    hearts: u32,
    answered: Vec<AnsweredRecord>,
    answered_index: HashMap<QuestionId, usize>,
    feedback: Option<Feedback>,
}

impl SessionState {
    /// State at the start of an attempt.
    #[must_use]
    pub fn fresh(max_hearts: u32) -> Self {
        Self {
            current_index: 0,
            score: 0,
            hearts: max_hearts,
            answered: Vec::new(),
            answered_index: HashMap::new(),
            feedback: None,
        }
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn hearts(&self) -> u32 {
        self.hearts
    }

    #[must_use]
    pub fn answered(&self) -> &[AnsweredRecord] {
        &self.answered
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answered.len()
    }

    #[must_use]
    pub fn is_answered(&self, id: QuestionId) -> bool {
        self.answered_index.contains_key(&id)
    }

    #[must_use]
    pub fn record_for(&self, id: QuestionId) -> Option<&AnsweredRecord> {
        self.answered_index.get(&id).map(|&pos| &self.answered[pos])
    }

    /// Feedback currently revealed, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    #[must_use]
    pub fn is_revealed(&self) -> bool {
        self.feedback.is_some()
    }

    #[must_use]
    pub fn correct_count(&self) -> u32 {
        let correct = self.answered.iter().filter(|r| r.was_correct).count();
        u32::try_from(correct).unwrap_or(u32::MAX)
    }

    /// Append a record, bump the score when correct and reveal its feedback.
    ///
    /// # Errors
    ///
    /// Returns `StateError::DuplicateAnswer` if the question already has a record.
    pub fn record(&mut self, record: AnsweredRecord) -> Result<(), StateError> {
        if self.is_answered(record.question_id) {
            return Err(StateError::DuplicateAnswer(record.question_id));
        }
        if record.was_correct {
            self.score = self.score.saturating_add(1);
        }
        self.feedback = Some(record.feedback());
        self.answered_index
            .insert(record.question_id, self.answered.len());
        self.answered.push(record);
        Ok(())
    }

    /// Remove one heart, never going below zero. Returns the hearts left.
    pub fn lose_heart(&mut self) -> u32 {
        self.hearts = self.hearts.saturating_sub(1);
        self.hearts
    }

    /// Move to the next question and hide feedback.
    pub fn advance(&mut self) {
        self.current_index += 1;
        self.feedback = None;
    }

    /// Start the attempt over.
    pub fn reset(&mut self, max_hearts: u32) {
        *self = Self::fresh(max_hearts);
    }

    fn rebuild_index(answered: &[AnsweredRecord]) -> Result<HashMap<QuestionId, usize>, StateError> {
        let mut index = HashMap::with_capacity(answered.len());
        for (pos, record) in answered.iter().enumerate() {
            if index.insert(record.question_id, pos).is_some() {
                return Err(StateError::DuplicateAnswer(record.question_id));
            }
        }
        Ok(index)
    }
}

//
// ─── PERSISTED SHAPE ───────────────────────────────────────────────────────────
//

/// Wire shape of a session snapshot payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSessionState {
    current_question_index: usize,
    score: u32,
    hearts: u32,
    #[serde(default)]
    answered_questions: Vec<AnsweredRecord>,
    #[serde(default)]
    show_result: bool,
    #[serde(default)]
    is_correct: bool,
    #[serde(default)]
    correct_answer: String,
    #[serde(default)]
    explanation: String,
}

impl From<SessionState> for PersistedSessionState {
    fn from(state: SessionState) -> Self {
        let (show_result, is_correct, correct_answer, explanation) = match state.feedback {
            Some(f) => (true, f.is_correct, f.correct_answer, f.explanation),
            None => (false, false, String::new(), String::new()),
        };
        Self {
            current_question_index: state.current_index,
            score: state.score,
            hearts: state.hearts,
            answered_questions: state.answered,
            show_result,
            is_correct,
            correct_answer,
            explanation,
        }
    }
}

impl TryFrom<PersistedSessionState> for SessionState {
    type Error = StateError;

    fn try_from(p: PersistedSessionState) -> Result<Self, Self::Error> {
        let answered_index = SessionState::rebuild_index(&p.answered_questions)?;

        if p.answered_questions.len() > p.current_question_index + 1 {
            return Err(StateError::HistoryAheadOfIndex {
                answered: p.answered_questions.len(),
                index: p.current_question_index,
            });
        }

        let state = Self {
            current_index: p.current_question_index,
            score: p.score,
            hearts: p.hearts,
            answered: p.answered_questions,
            answered_index,
            feedback: p.show_result.then_some(Feedback {
                is_correct: p.is_correct,
                correct_answer: p.correct_answer,
                explanation: p.explanation,
            }),
        };

        let correct = state.correct_count();
        if state.score > correct {
            return Err(StateError::ScoreExceedsCorrect {
                score: state.score,
                correct,
            });
        }
        Ok(state)
    }
}
