mod answered;
mod ids;
mod question;
mod result;
mod settings;
mod state;

pub use ids::{LessonId, ParseIdError, QuestionId};

pub use answered::{AnsweredRecord, Feedback};
pub use question::{Question, QuestionError, QuestionKind, WordTranslation};
pub use result::{LessonResult, stars_for_accuracy};
pub use settings::{SessionSettings, SettingsError};
pub use state::{SessionState, StateError};
