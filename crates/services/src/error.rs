//! Shared error types for the services crate.

use thiserror::Error;

/// Errors emitted while loading the question bank.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BankError {
    #[error("failed to read question source: {0}")]
    Io(#[from] std::io::Error),
    #[error("question source is not a JSON array: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors emitted by session services.
///
/// Invalid transitions (picking a locked answer, moving past the end) are not
/// errors; they come back as `PickOutcome::Rejected` or `Step::Idle`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("select at least one topic")]
    NoTopics,
    #[error("no questions available for the selected topics")]
    EmptyPool,
    #[error(transparent)]
    Bank(#[from] BankError),
}
