use chrono::{DateTime, Utc};

use trainer_core::model::{Mode, Report, ReportId, choice_letter};

use super::quiz::QuizSession;

/// How a choice should be coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceState {
    Neutral,
    Correct,
    Wrong,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceView {
    pub letter: char,
    pub text: String,
    pub selected: bool,
    pub state: ChoiceState,
}

/// Render payload for the question on screen.
///
/// Feedback (colouring and explanation) is only ever filled in for answered
/// practice questions; exam payloads never carry it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub total: usize,
    pub mode: Mode,
    pub topic: String,
    pub text: String,
    pub choices: Vec<ChoiceView>,
    pub locked: bool,
    pub feedback_visible: bool,
    pub explanation: Option<String>,
    pub can_go_back: bool,
    pub can_advance: bool,
    pub is_last: bool,
}

impl QuestionView {
    pub(crate) fn from_session(session: &QuizSession) -> Option<Self> {
        let index = session.current_index()?;
        let question = session.current_question()?;
        let answer = session.current_answer();
        let feedback_visible = answer.is_some() && session.mode().reveals_feedback();

        let choices = question
            .choices()
            .iter()
            .enumerate()
            .map(|(idx, text)| {
                let picked = answer.is_some_and(|a| a.picked_index == idx);
                let state = if !feedback_visible {
                    ChoiceState::Neutral
                } else if question.is_correct(idx) {
                    ChoiceState::Correct
                } else if picked {
                    ChoiceState::Wrong
                } else {
                    ChoiceState::Neutral
                };
                ChoiceView {
                    letter: choice_letter(idx).unwrap_or('?'),
                    text: text.clone(),
                    selected: picked,
                    state,
                }
            })
            .collect();

        Some(Self {
            index,
            total: session.len(),
            mode: session.mode(),
            topic: question.topic().to_owned(),
            text: question.text().to_owned(),
            choices,
            locked: answer.is_some_and(|a| a.locked),
            feedback_visible,
            explanation: if feedback_visible {
                question.explanation().map(str::to_owned)
            } else {
                None
            },
            can_go_back: session.can_go_back(),
            can_advance: session.can_advance(),
            is_last: index + 1 == session.len(),
        })
    }
}

/// Presentation-agnostic history row.
///
/// No pre-formatted strings; the UI formats timestamps as it likes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryListItem {
    pub id: ReportId,
    pub mode: Mode,
    pub completed_at: DateTime<Utc>,
    pub correct: usize,
    pub total: usize,
    pub percent: u32,
}

impl HistoryListItem {
    #[must_use]
    pub fn from_report(report: &Report) -> Self {
        let score = report.score();
        Self {
            id: report.id(),
            mode: report.mode(),
            completed_at: report.timestamp(),
            correct: score.correct,
            total: score.total,
            percent: score.percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trainer_core::model::{Question, QuestionId};

    fn session(mode: Mode) -> QuizSession {
        let questions = (0..2)
            .map(|id| {
                Question::new(
                    QuestionId::new(id),
                    "Hives",
                    format!("Q{id}"),
                    vec!["w".into(), "x".into(), "y".into(), "z".into()],
                    1,
                )
                .with_explanation(Some("Because.".into()))
            })
            .collect();
        QuizSession::new(mode, vec!["Hives".into()], questions)
    }

    #[test]
    fn unanswered_question_shows_no_feedback() {
        let view = session(Mode::Practice).view().unwrap();
        assert_eq!(view.index, 0);
        assert!(!view.feedback_visible);
        assert!(!view.can_advance);
        assert!(!view.can_go_back);
        assert!(view.explanation.is_none());
        assert_eq!(view.choices[0].letter, 'a');
        assert!(view.choices.iter().all(|c| c.state == ChoiceState::Neutral));
    }

    #[test]
    fn answered_practice_question_is_coloured() {
        let mut s = session(Mode::Practice);
        s.pick(3);
        let view = s.view().unwrap();
        assert!(view.locked);
        assert!(view.feedback_visible);
        assert!(view.can_advance);
        assert_eq!(view.explanation.as_deref(), Some("Because."));
        assert_eq!(view.choices[1].state, ChoiceState::Correct);
        assert_eq!(view.choices[3].state, ChoiceState::Wrong);
        assert!(view.choices[3].selected);
        assert_eq!(view.choices[0].state, ChoiceState::Neutral);
    }

    #[test]
    fn exam_view_hides_feedback() {
        let mut s = session(Mode::Exam);
        s.pick(3);
        let view = s.view().unwrap();
        assert!(!view.locked);
        assert!(!view.feedback_visible);
        assert!(view.explanation.is_none());
        assert!(view.choices[3].selected);
        assert!(view.choices.iter().all(|c| c.state == ChoiceState::Neutral));
        assert!(view.can_advance);
    }

    #[test]
    fn revisiting_restores_practice_feedback() {
        let mut s = session(Mode::Practice);
        s.pick(1);
        s.next();
        let second = s.view().unwrap();
        assert!(second.is_last);
        assert!(!second.feedback_visible);
        s.prev();
        let first = s.view().unwrap();
        assert!(first.feedback_visible);
        assert_eq!(first.choices[1].state, ChoiceState::Correct);
    }
}
