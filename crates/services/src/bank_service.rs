use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use trainer_core::bank::{QuestionBank, RawQuestion};

use crate::error::BankError;

/// Where raw question records come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch every raw record.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the source cannot be read or parsed.
    async fn fetch(&self) -> Result<Vec<RawQuestion>, BankError>;
}

/// Reads a JSON array of question records from disk.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a JSON array of records.
    ///
    /// Array elements that are not objects are dropped here; incomplete
    /// records are dropped later by the bank build.
    ///
    /// # Errors
    ///
    /// Returns `BankError::Parse` if `json` is not an array.
    pub fn parse(json: &str) -> Result<Vec<RawQuestion>, BankError> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        let total = values.len();
        let records: Vec<RawQuestion> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        if records.len() < total {
            debug!(dropped = total - records.len(), "malformed question records");
        }
        Ok(records)
    }
}

#[async_trait]
impl QuestionSource for JsonFileSource {
    async fn fetch(&self) -> Result<Vec<RawQuestion>, BankError> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        Self::parse(&json)
    }
}

/// Loads the bank once and hands out shared references to it.
///
/// Concurrent callers of [`BankService::ensure_loaded`] wait on the same
/// in-flight load; once loaded, the bank is never rebuilt. A failed load is
/// not cached, so the next call tries again.
#[derive(Clone)]
pub struct BankService {
    source: Option<Arc<dyn QuestionSource>>,
    bank: Arc<OnceCell<Arc<QuestionBank>>>,
}

impl BankService {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source: Some(source),
            bank: Arc::new(OnceCell::new()),
        }
    }

    /// A service around an already-built bank.
    #[must_use]
    pub fn from_bank(bank: QuestionBank) -> Self {
        Self {
            source: None,
            bank: Arc::new(OnceCell::new_with(Some(Arc::new(bank)))),
        }
    }

    /// Return the bank, loading it first if needed.
    ///
    /// # Errors
    ///
    /// Returns `BankError` if the source fails.
    pub async fn ensure_loaded(&self) -> Result<Arc<QuestionBank>, BankError> {
        let bank = self
            .bank
            .get_or_try_init(|| async {
                let records = match &self.source {
                    Some(source) => source.fetch().await?,
                    None => Vec::new(),
                };
                let bank = QuestionBank::build(records);
                let stats = bank.stats();
                info!(
                    questions = bank.len(),
                    topics = bank.topics().len(),
                    incomplete = stats.incomplete,
                    duplicates = stats.duplicates,
                    "question bank loaded"
                );
                if stats.defaulted_answers > 0 {
                    warn!(
                        count = stats.defaulted_answers,
                        "questions without a recognised answer letter default to choice a"
                    );
                }
                Ok::<_, BankError>(Arc::new(bank))
            })
            .await?;
        Ok(Arc::clone(bank))
    }

    /// The bank if a load already completed.
    #[must_use]
    pub fn loaded(&self) -> Option<Arc<QuestionBank>> {
        self.bank.get().cloned()
    }
}
