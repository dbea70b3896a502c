use chrono::{DateTime, Utc};
use std::fmt;

use trainer_core::model::{Answer, Mode, Question, Snapshot};
use trainer_core::scoring::Attempt;

use super::progress::SessionProgress;
use super::view::QuestionView;

//
// ─── TRANSITION RESULTS ────────────────────────────────────────────────────────
//

/// Result of picking a choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickOutcome {
    /// The pick was stored. `feedback` tells the view whether correctness and
    /// the explanation may be shown now.
    Recorded { is_correct: bool, feedback: bool },
    /// Nothing changed.
    Rejected(PickRejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickRejection {
    /// The question already has a locked practice answer.
    Locked,
    /// The choice index does not exist on the question.
    NoSuchChoice,
    /// The question index is outside the session.
    NoSuchQuestion,
    /// The session has already been submitted.
    Finished,
}

/// Result of a `next`/`prev` navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Now showing the question at this index.
    Moved(usize),
    /// The last question was passed; the session is terminal.
    Finished,
    /// The move was not allowed; nothing changed.
    Idle,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz attempt: session-scoped question copies, one answer slot per
/// question and the current position.
///
/// `position == questions.len()` marks the session as finished; no further
/// transitions are accepted after that.
#[derive(Clone)]
pub struct QuizSession {
    mode: Mode,
    topics: Vec<String>,
    questions: Vec<Question>,
    answers: Vec<Option<Answer>>,
    position: usize,
}

impl QuizSession {
    pub(crate) fn new(mode: Mode, topics: Vec<String>, questions: Vec<Question>) -> Self {
        let answers = vec![None; questions.len()];
        Self {
            mode,
            topics,
            questions,
            answers,
            position: 0,
        }
    }

    /// Rebuild a practice session from a validated snapshot.
    ///
    /// `questions` must be the bank questions for `snapshot.question_ids`, in
    /// order. Returns `None` if a stored answer does not fit its question: a
    /// pick past the last choice, or a verdict the question disagrees with.
    pub(crate) fn restore(snapshot: Snapshot, questions: Vec<Question>) -> Option<Self> {
        if snapshot.question_ids.len() != questions.len() {
            return None;
        }
        let fits = snapshot.answers.iter().zip(&questions).all(|(answer, question)| {
            answer.as_ref().is_none_or(|a| {
                question.choice(a.picked_index).is_some()
                    && a.correct_index == question.correct_index()
                    && a.is_correct == question.is_correct(a.picked_index)
            })
        });
        if !fits {
            return None;
        }
        Some(Self {
            mode: snapshot.mode,
            topics: snapshot.topics,
            questions,
            answers: snapshot.answers,
            position: snapshot.position,
        })
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &[Option<Answer>] {
        &self.answers
    }

    #[must_use]
    pub fn answer(&self, index: usize) -> Option<&Answer> {
        self.answers.get(index).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.position >= self.questions.len()
    }

    /// Index of the question on screen, `None` once finished.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        (!self.is_finished()).then_some(self.position)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index()?)
    }

    #[must_use]
    pub fn current_answer(&self) -> Option<&Answer> {
        self.answer(self.current_index()?)
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.answers.iter().flatten().filter(|a| a.is_correct).count()
    }

    /// Pick `choice` on the current question.
    pub fn pick(&mut self, choice: usize) -> PickOutcome {
        match self.current_index() {
            Some(index) => self.pick_at(index, choice),
            None => PickOutcome::Rejected(PickRejection::Finished),
        }
    }

    /// Pick `choice` on the question at `index`.
    ///
    /// Practice answers lock on the first pick; later picks on the same
    /// question are rejected. Exam answers are overwritten freely.
    pub fn pick_at(&mut self, index: usize, choice: usize) -> PickOutcome {
        if self.is_finished() {
            return PickOutcome::Rejected(PickRejection::Finished);
        }
        let Some(question) = self.questions.get(index) else {
            return PickOutcome::Rejected(PickRejection::NoSuchQuestion);
        };
        if self.answer(index).is_some_and(|a| a.locked) {
            return PickOutcome::Rejected(PickRejection::Locked);
        }
        if question.choice(choice).is_none() {
            return PickOutcome::Rejected(PickRejection::NoSuchChoice);
        }

        let answer = Answer::record(question, choice, self.mode);
        let is_correct = answer.is_correct;
        self.answers[index] = Some(answer);

        PickOutcome::Recorded {
            is_correct,
            feedback: self.mode.reveals_feedback(),
        }
    }

    /// Forward navigation opens once the current question has an answer.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.current_answer().is_some()
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.current_index().is_some_and(|index| index > 0)
    }

    /// Move to the next question, or finish when on the last one.
    pub fn next(&mut self) -> Step {
        if !self.can_advance() {
            return Step::Idle;
        }
        self.position += 1;
        if self.is_finished() {
            Step::Finished
        } else {
            Step::Moved(self.position)
        }
    }

    /// Move back one question. Answers are left untouched.
    pub fn prev(&mut self) -> Step {
        if !self.can_go_back() {
            return Step::Idle;
        }
        self.position -= 1;
        Step::Moved(self.position)
    }

    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        SessionProgress {
            mode: self.mode,
            position: self.position,
            total: self.questions.len(),
            correct: (self.mode == Mode::Practice).then(|| self.correct_count()),
            is_complete: self.is_finished(),
        }
    }

    /// Render payload for the current question.
    #[must_use]
    pub fn view(&self) -> Option<QuestionView> {
        QuestionView::from_session(self)
    }

    /// Resumable capture of this session.
    ///
    /// Only in-progress practice sessions produce a snapshot.
    #[must_use]
    pub fn snapshot(&self, at: DateTime<Utc>) -> Option<Snapshot> {
        if self.mode != Mode::Practice || self.is_empty() || self.is_finished() {
            return None;
        }
        Some(Snapshot {
            timestamp: at,
            mode: self.mode,
            question_ids: self.questions.iter().map(Question::id).collect(),
            position: self.position,
            answers: self.answers.clone(),
            topics: self.topics.clone(),
        })
    }

    /// Borrowed view for scoring.
    #[must_use]
    pub fn attempt(&self) -> Attempt<'_> {
        Attempt {
            mode: self.mode,
            topics: &self.topics,
            questions: &self.questions,
            answers: &self.answers,
        }
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("mode", &self.mode)
            .field("questions_len", &self.questions.len())
            .field("answered", &self.answers.iter().flatten().count())
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
