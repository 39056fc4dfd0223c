mod effects;
mod engine;
mod progress;
mod store;
mod workflow;

// Public API of the session subsystem.
pub use effects::{EffectDispatcher, SessionEffect};
pub use engine::{LessonSession, SessionPhase};
pub use progress::SessionProgress;
pub use store::SessionStateStore;
pub use workflow::{LessonSessionLoop, SessionIntent, StepOutcome};
