use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use trainer_core::apportion::allocate;
use trainer_core::bank::QuestionBank;
use trainer_core::model::{Mode, Question, TrainerSettings};

use crate::error::SessionError;
use super::quiz::QuizSession;

/// Samples questions from the bank into a new session.
///
/// Seats are spread over the selected topics in proportion to how many
/// questions each topic has, then each topic is sampled without replacement
/// and the whole selection is shuffled so topic order does not show.
pub struct SessionBuilder<'a> {
    bank: &'a QuestionBank,
    settings: &'a TrainerSettings,
}

impl<'a> SessionBuilder<'a> {
    #[must_use]
    pub fn new(bank: &'a QuestionBank, settings: &'a TrainerSettings) -> Self {
        Self { bank, settings }
    }

    /// Exam over every topic, sized by the settings' exam size.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::EmptyPool` if the bank has no questions.
    pub fn exam<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<QuizSession, SessionError> {
        self.build(Mode::Exam, self.bank.topics(), self.settings.exam_size(), rng)
    }

    /// Practice over `topics`, `count` clamped to the allowed range.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoTopics` for an empty selection and
    /// `SessionError::EmptyPool` if the selected topics have no questions.
    pub fn practice<R: Rng + ?Sized>(
        &self,
        topics: &[String],
        count: usize,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let count = self.settings.clamp_practice_count(count);
        self.build(Mode::Practice, topics, count, rng)
    }

    /// Build a session of up to `desired` questions drawn from `topics`.
    ///
    /// The result is shorter than `desired` only when the topics together
    /// hold fewer questions; it is never padded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoTopics` if `topics` is empty and
    /// `SessionError::EmptyPool` if no question matches.
    pub fn build<R: Rng + ?Sized>(
        &self,
        mode: Mode,
        topics: &[String],
        desired: usize,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let mut active: Vec<String> = Vec::with_capacity(topics.len());
        for topic in topics {
            if !active.contains(topic) {
                active.push(topic.clone());
            }
        }
        if active.is_empty() {
            return Err(SessionError::NoTopics);
        }

        let mut pools: Vec<Vec<&Question>> = active
            .iter()
            .map(|topic| self.bank.questions_in(topic).collect())
            .collect();
        let sizes: Vec<usize> = pools.iter().map(Vec::len).collect();
        if sizes.iter().all(|size| *size == 0) {
            return Err(SessionError::EmptyPool);
        }

        let seats = allocate(desired, &sizes);
        let mut picked: Vec<Question> = Vec::with_capacity(desired.min(sizes.iter().sum()));
        for (pool, seats) in pools.iter_mut().zip(&seats) {
            pool.shuffle(rng);
            picked.extend(pool.iter().take(*seats).map(|q| (*q).clone()));
        }
        picked.shuffle(rng);

        debug!(
            %mode,
            desired,
            size = picked.len(),
            ?sizes,
            ?seats,
            "session built"
        );

        Ok(QuizSession::new(mode, active, picked))
    }
}
