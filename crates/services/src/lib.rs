#![forbid(unsafe_code)]

pub mod api;
pub mod app_services;
pub mod error;
pub mod sessions;

pub use lesson_core::Clock;
pub use sessions as session;

pub use app_services::AppServices;
pub use error::{ApiError, AppServicesError, LoadError, RestoreError, TransitionError};
pub use sessions::{
    LessonSession, LessonSessionLoop, SessionEffect, SessionIntent, SessionPhase,
    SessionProgress, SessionStateStore, StepOutcome,
};
