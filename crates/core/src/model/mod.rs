mod answer;
mod ids;
mod question;
mod report;
mod settings;
mod snapshot;
pub mod topic;

pub use answer::{Answer, Mode};
pub use ids::{ParseIdError, QuestionId, ReportId};
pub use question::{
    CHOICE_COUNT, MAX_DIFFICULTY, MIN_DIFFICULTY, Question, choice_letter, letter_index,
};
pub use report::{
    Advice, MissedQuestion, Report, ReportAnswer, ReviewGroup, Score, TopicScore, rounded_percent,
};
pub use settings::{SettingsError, TrainerSettings};
pub use snapshot::{Snapshot, SnapshotError};
pub use topic::compare_topics;
