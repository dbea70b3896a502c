use rand::Rng;
use tracing::{info, warn};

use trainer_core::Clock;
use trainer_core::model::{Mode, Question, ReportId, TrainerSettings};
use trainer_core::scoring::{Scorecard, ScoringEngine};

use crate::bank_service::BankService;
use crate::error::SessionError;
use super::plan::SessionBuilder;
use super::quiz::{PickOutcome, QuizSession, Step};
use super::store::SessionStore;
use super::view::HistoryListItem;

/// What the last session was started from, for "retry same".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub mode: Mode,
    pub topics: Vec<String>,
    /// Requested size; the exam size for exams.
    pub count: usize,
}

/// Result of advancing a session through the loop service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    Moved(usize),
    /// The session was completed, scored and archived.
    Finished(Box<Scorecard>),
    Idle,
}

/// Orchestrates starting, persisting and finishing quiz sessions.
///
/// The session itself is owned by the caller and passed in by reference; the
/// service only keeps the last selection so it can be retried.
pub struct QuizLoopService {
    clock: Clock,
    settings: TrainerSettings,
    bank: BankService,
    store: SessionStore,
    last_selection: Option<Selection>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(bank: BankService, store: SessionStore) -> Self {
        Self {
            clock: Clock::default(),
            settings: TrainerSettings::default(),
            bank,
            store,
            last_selection: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: TrainerSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &TrainerSettings {
        &self.settings
    }

    #[must_use]
    pub fn last_selection(&self) -> Option<&Selection> {
        self.last_selection.as_ref()
    }

    /// All topics in the bank, loading it if needed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` if the bank cannot be loaded.
    pub async fn topics(&self) -> Result<Vec<String>, SessionError> {
        let bank = self.bank.ensure_loaded().await?;
        Ok(bank.topics().to_vec())
    }

    /// Number of questions a practice session over `topics` can draw from.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` if the bank cannot be loaded.
    pub async fn availability(&self, topics: &[String]) -> Result<usize, SessionError> {
        let bank = self.bank.ensure_loaded().await?;
        Ok(bank.pool_size(topics))
    }

    /// Practice count to preselect: the last one used, else the default.
    pub async fn default_practice_count(&self) -> usize {
        self.store
            .load_practice_count()
            .await
            .map_or(self.settings.default_practice_count(), |count| {
                self.settings.clamp_practice_count(count)
            })
    }

    /// Start a practice session and write its first snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the bank cannot be loaded, no topic is
    /// selected, or the topics hold no questions.
    pub async fn start_practice<R: Rng + ?Sized>(
        &mut self,
        topics: &[String],
        count: usize,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let bank = self.bank.ensure_loaded().await?;
        let count = self.settings.clamp_practice_count(count);
        let session = SessionBuilder::new(&bank, &self.settings).practice(topics, count, rng)?;

        self.store.save_practice_count(count).await;
        self.store.save_snapshot(&session, self.clock.now()).await;
        self.last_selection = Some(Selection {
            mode: Mode::Practice,
            topics: session.topics().to_vec(),
            count,
        });
        info!(questions = session.len(), topics = ?session.topics(), "practice started");
        Ok(session)
    }

    /// Start an exam over every topic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the bank cannot be loaded or is empty.
    pub async fn start_exam<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<QuizSession, SessionError> {
        let bank = self.bank.ensure_loaded().await?;
        let session = SessionBuilder::new(&bank, &self.settings).exam(rng)?;

        self.last_selection = Some(Selection {
            mode: Mode::Exam,
            topics: session.topics().to_vec(),
            count: self.settings.exam_size(),
        });
        info!(questions = session.len(), "exam started");
        Ok(session)
    }

    /// Start a fresh session from the last selection, if there is one.
    ///
    /// # Errors
    ///
    /// Same as [`QuizLoopService::start_practice`] and
    /// [`QuizLoopService::start_exam`].
    pub async fn retry_same<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Result<Option<QuizSession>, SessionError> {
        let Some(selection) = self.last_selection.clone() else {
            return Ok(None);
        };
        let session = match selection.mode {
            Mode::Practice => {
                self.start_practice(&selection.topics, selection.count, rng)
                    .await?
            }
            Mode::Exam => self.start_exam(rng).await?,
        };
        Ok(Some(session))
    }

    pub async fn has_resume(&self) -> bool {
        self.store.has_snapshot().await
    }

    /// Rebuild the stored practice session.
    ///
    /// A snapshot that refers to questions the bank no longer has, or whose
    /// answers do not fit those questions, is discarded.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Bank` if the bank cannot be loaded.
    pub async fn resume(&mut self) -> Result<Option<QuizSession>, SessionError> {
        let Some(snapshot) = self.store.load_snapshot().await else {
            return Ok(None);
        };
        let bank = self.bank.ensure_loaded().await?;
        let questions: Option<Vec<Question>> = snapshot
            .question_ids
            .iter()
            .map(|id| bank.get(*id).cloned())
            .collect();
        let Some(session) = questions.and_then(|questions| QuizSession::restore(snapshot, questions))
        else {
            warn!("snapshot does not match the question bank; discarding it");
            self.store.clear_snapshot().await;
            return Ok(None);
        };

        self.last_selection = Some(Selection {
            mode: Mode::Practice,
            topics: session.topics().to_vec(),
            count: session.len(),
        });
        info!(
            position = session.position(),
            questions = session.len(),
            "practice resumed"
        );
        Ok(Some(session))
    }

    /// Pick a choice on the current question, saving the snapshot if it
    /// changed anything.
    pub async fn pick(&self, session: &mut QuizSession, choice: usize) -> PickOutcome {
        let outcome = session.pick(choice);
        if matches!(outcome, PickOutcome::Recorded { .. }) {
            self.store.save_snapshot(session, self.clock.now()).await;
        }
        outcome
    }

    /// Move forward; passing the last question scores and archives the
    /// session.
    pub async fn next(&self, session: &mut QuizSession) -> Advance {
        match session.next() {
            Step::Moved(position) => {
                self.store.save_snapshot(session, self.clock.now()).await;
                Advance::Moved(position)
            }
            Step::Finished => Advance::Finished(Box::new(self.finish(session).await)),
            Step::Idle => Advance::Idle,
        }
    }

    pub async fn prev(&self, session: &mut QuizSession) -> Advance {
        match session.prev() {
            Step::Moved(position) => {
                self.store.save_snapshot(session, self.clock.now()).await;
                Advance::Moved(position)
            }
            Step::Finished | Step::Idle => Advance::Idle,
        }
    }

    /// Abandon `session` without archiving it.
    pub async fn go_home(&self, session: QuizSession) {
        if session.mode() == Mode::Practice {
            self.store.clear_snapshot().await;
        }
        info!(mode = %session.mode(), position = session.position(), "session abandoned");
    }

    /// Completed sessions, newest first.
    pub async fn history(&self) -> Vec<HistoryListItem> {
        self.store
            .list_reports()
            .await
            .iter()
            .map(HistoryListItem::from_report)
            .collect()
    }

    pub async fn reset_history(&self) {
        self.store.reset().await;
        info!("history cleared");
    }

    async fn finish(&self, session: &QuizSession) -> Scorecard {
        self.store.clear_snapshot().await;
        let scorecard = ScoringEngine::new(&self.settings).score(
            &session.attempt(),
            ReportId::random(),
            self.clock.now(),
        );
        self.store.append_report(&scorecard.report).await;

        let score = scorecard.report.score();
        info!(
            mode = %session.mode(),
            correct = score.correct,
            total = score.total,
            percent = score.percent,
            "session finished"
        );
        scorecard
    }
}
