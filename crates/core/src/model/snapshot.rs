use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::{Answer, Mode};
use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("only practice sessions can be resumed")]
    NotPractice,

    #[error("snapshot has no questions")]
    NoQuestions,

    #[error("position {position} is outside a session of {len} questions")]
    PositionOutOfRange { position: usize, len: usize },

    #[error("snapshot has {answers} answer slots for {questions} questions")]
    AnswerCountMismatch { answers: usize, questions: usize },

    #[error("answer at {index} belongs to another question")]
    AnswerMismatch { index: usize },

    #[error("answer at {index} is not locked")]
    UnlockedAnswer { index: usize },
}

/// Resumable capture of an in-progress practice session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub mode: Mode,
    pub question_ids: Vec<QuestionId>,
    pub position: usize,
    pub answers: Vec<Option<Answer>>,
    #[serde(default)]
    pub topics: Vec<String>,
}

impl Snapshot {
    /// Check that the snapshot describes a session that can be resumed.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` if the mode is not practice, the position does
    /// not point at a question, or the answers do not line up with the ids.
    /// Practice answers are always locked, so an open one is rejected too.
    pub fn validate(self) -> Result<Self, SnapshotError> {
        if self.mode != Mode::Practice {
            return Err(SnapshotError::NotPractice);
        }
        let len = self.question_ids.len();
        if len == 0 {
            return Err(SnapshotError::NoQuestions);
        }
        if self.position >= len {
            return Err(SnapshotError::PositionOutOfRange {
                position: self.position,
                len,
            });
        }
        if self.answers.len() != len {
            return Err(SnapshotError::AnswerCountMismatch {
                answers: self.answers.len(),
                questions: len,
            });
        }
        for (index, (answer, id)) in self.answers.iter().zip(&self.question_ids).enumerate() {
            let Some(answer) = answer else {
                continue;
            };
            if answer.question_id != *id {
                return Err(SnapshotError::AnswerMismatch { index });
            }
            if !answer.locked {
                return Err(SnapshotError::UnlockedAnswer { index });
            }
        }
        Ok(self)
    }
}
