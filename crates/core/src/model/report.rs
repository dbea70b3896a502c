use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::answer::Mode;
use crate::model::ids::{QuestionId, ReportId};

/// Percentage rounded half-up, `0` when `whole` is zero.
#[must_use]
pub fn rounded_percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part as u128;
    let whole = whole as u128;
    let pct = (200 * part + whole) / (2 * whole);
    u32::try_from(pct).unwrap_or(u32::MAX)
}

//
// ─── SCORE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
}

impl Score {
    #[must_use]
    pub fn new(correct: usize, total: usize) -> Self {
        Self {
            correct,
            total,
            percent: rounded_percent(correct, total),
        }
    }

    /// Badge text, e.g. `"85%"`.
    #[must_use]
    pub fn percent_label(&self) -> String {
        format!("{}%", self.percent)
    }
}

//
// ─── REPORT ────────────────────────────────────────────────────────────────────
//

/// Per-question outcome kept in the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportAnswer {
    pub question_id: QuestionId,
    pub is_correct: bool,
    pub topic: String,
}

/// Immutable record of a finished session, appended to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    id: ReportId,
    mode: Mode,
    timestamp: DateTime<Utc>,
    topics: Vec<String>,
    question_count: usize,
    answers: Vec<ReportAnswer>,
    score: Score,
}

impl Report {
    #[must_use]
    pub fn new(
        id: ReportId,
        mode: Mode,
        timestamp: DateTime<Utc>,
        topics: Vec<String>,
        answers: Vec<ReportAnswer>,
        score: Score,
    ) -> Self {
        Self {
            id,
            mode,
            timestamp,
            topics,
            question_count: score.total,
            answers,
            score,
        }
    }

    #[must_use]
    pub fn id(&self) -> ReportId {
        self.id
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.question_count
    }

    #[must_use]
    pub fn answers(&self) -> &[ReportAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn score(&self) -> Score {
        self.score
    }
}

//
// ─── BREAKDOWN ─────────────────────────────────────────────────────────────────
//

/// Correct/answered tally for one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicScore {
    pub topic: String,
    pub good: usize,
    pub total: usize,
    pub percent: u32,
}

/// Recommendation shown under the score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advice {
    /// Weakest topics first.
    PracticeMore(Vec<String>),
    KeepItUp,
}

/// A wrongly answered exam question, for review after submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedQuestion {
    pub question_id: QuestionId,
    pub position: usize,
    pub text: String,
    pub your_answer: Option<String>,
    pub correct_answer: Option<String>,
}

/// Missed questions of one topic, in session order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewGroup {
    pub topic: String,
    pub questions: Vec<MissedQuestion>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(rounded_percent(1, 8), 13); // 12.5
        assert_eq!(rounded_percent(2, 3), 67);
        assert_eq!(rounded_percent(1, 3), 33);
        assert_eq!(rounded_percent(0, 0), 0);
        assert_eq!(rounded_percent(10, 10), 100);
    }

    #[test]
    fn score_label() {
        let score = Score::new(17, 20);
        assert_eq!(score.percent, 85);
        assert_eq!(score.percent_label(), "85%");
    }

    #[test]
    fn report_serializes_history_shape() {
        let report = Report::new(
            ReportId::random(),
            Mode::Exam,
            fixed_now(),
            vec!["Bees".into()],
            vec![ReportAnswer {
                question_id: QuestionId::new(2),
                is_correct: true,
                topic: "Bees".into(),
            }],
            Score::new(1, 1),
        );
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "exam");
        assert_eq!(json["questionCount"], 1);
        assert_eq!(json["score"]["percent"], 100);
        assert_eq!(json["answers"][0]["questionId"], 2);

        let back: Report = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
