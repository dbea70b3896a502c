use serde::{Deserialize, Serialize};
use std::fmt;

use crate::model::ids::QuestionId;
use crate::model::question::Question;

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// How a session treats picks.
///
/// - `Practice`: feedback right after a pick, the answer locks, and the session
///   can be resumed later.
/// - `Exam`: no feedback until the end, picks may be changed freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Practice,
    Exam,
}

impl Mode {
    /// Whether a pick locks the answer for that question.
    #[must_use]
    pub fn locks_answers(self) -> bool {
        matches!(self, Mode::Practice)
    }

    /// Whether correctness and explanations are shown during the attempt.
    #[must_use]
    pub fn reveals_feedback(self) -> bool {
        matches!(self, Mode::Practice)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Practice => f.pad("practice"),
            Mode::Exam => f.pad("exam"),
        }
    }
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A pick recorded for one question of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub question_id: QuestionId,
    pub picked_index: usize,
    pub correct_index: usize,
    pub is_correct: bool,
    pub topic: String,
    pub locked: bool,
}

impl Answer {
    /// Record `picked` against `question`; practice picks lock immediately.
    #[must_use]
    pub fn record(question: &Question, picked: usize, mode: Mode) -> Self {
        Self {
            question_id: question.id(),
            picked_index: picked,
            correct_index: question.correct_index(),
            is_correct: question.is_correct(picked),
            topic: question.topic().to_owned(),
            locked: mode.locks_answers(),
        }
    }
}
