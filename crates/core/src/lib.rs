#![forbid(unsafe_code)]

pub mod draft;
pub mod error;
pub mod matcher;
pub mod model;
pub mod prompt;
pub mod time;

pub use draft::AnswerDraft;
pub use error::Error;
pub use matcher::matches;
pub use time::Clock;
