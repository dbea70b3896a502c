#![forbid(unsafe_code)]

pub mod bank_service;
pub mod error;
pub mod sessions;

pub use trainer_core::Clock;

pub use bank_service::{BankService, JsonFileSource, QuestionSource};
pub use error::{BankError, SessionError};

pub use sessions::{
    Advance, ChoiceState, ChoiceView, HistoryListItem, PickOutcome, PickRejection, QuestionView,
    QuizLoopService, QuizSession, SessionBuilder, SessionProgress, SessionStore, Selection, Step,
};
