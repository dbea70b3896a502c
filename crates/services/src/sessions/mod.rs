mod plan;
mod progress;
mod quiz;
mod store;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use plan::SessionBuilder;
pub use progress::SessionProgress;
pub use quiz::{PickOutcome, PickRejection, QuizSession, Step};
pub use store::{PRACTICE_COUNT_KEY, RESUME_KEY, SESSIONS_KEY, SessionStore};
pub use view::{ChoiceState, ChoiceView, HistoryListItem, QuestionView};
pub use workflow::{Advance, QuizLoopService, Selection};
