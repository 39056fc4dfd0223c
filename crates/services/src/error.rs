//! Shared error types for the services crate.

use thiserror::Error;

use lesson_core::model::{ParseIdError, QuestionError, QuestionId};
use storage::sqlite::SqliteInitError;

/// Errors emitted by the lesson REST client and other backend collaborators.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("lesson api base url is not configured")]
    NotConfigured,
    #[error("invalid lesson api base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("lesson api request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Decode(#[from] QuestionError),
}

/// Refused session transitions. A refused transition leaves the session untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransitionError {
    #[error("question {0} was already answered in this attempt")]
    AlreadyAnswered(QuestionId),
    #[error("nothing to submit for the current question")]
    NothingToSubmit,
    #[error("{0:?} is not one of the question's options")]
    UnknownOption(String),
    #[error("the current question is not awaiting an answer")]
    NotAwaitingAnswer,
    #[error("no feedback is being shown")]
    NotShowingFeedback,
    #[error("no hearts left; restart or leave the lesson")]
    HeartsExhausted,
    #[error("lesson already completed")]
    Completed,
    #[error("lesson attempt was abandoned")]
    Exited,
}

/// Errors raised while starting a lesson. Terminal for the attempt; the user may retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("no lesson selected")]
    NoLessonSelected,
    #[error(transparent)]
    InvalidLessonId(#[from] ParseIdError),
    #[error("no questions found for this lesson")]
    Empty,
    #[error("failed to load questions: {0}")]
    Source(#[from] ApiError),
}

/// Reasons a stored snapshot cannot be applied to the loaded question set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RestoreError {
    #[error("snapshot index {index} is outside a lesson of {total} questions")]
    IndexOutOfRange { index: usize, total: usize },
    #[error("snapshot answers question {0}, which is not in this lesson")]
    UnknownQuestion(QuestionId),
    #[error("snapshot answers question {0}, which comes after the current one")]
    AnsweredAhead(QuestionId),
    #[error("snapshot has {hearts} hearts, more than the maximum of {max}")]
    TooManyHearts { hearts: u32, max: u32 },
    #[error("snapshot feedback flag disagrees with the answered history")]
    RevealMismatch,
    #[error("snapshot feedback for question {0} disagrees with its answered record")]
    FeedbackMismatch(QuestionId),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
