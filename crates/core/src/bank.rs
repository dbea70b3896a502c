//! Question bank built from raw source records.

use std::collections::HashSet;

use serde::de::{Deserializer, IgnoredAny};
use serde::Deserialize;

use crate::model::topic::sort_topics;
use crate::model::{MAX_DIFFICULTY, MIN_DIFFICULTY, Question, QuestionId, letter_index};

/// One record as it arrives from the question source.
///
/// Every field is optional and tolerant of the wrong JSON type, so a single
/// sloppy field cannot fail the whole record; incomplete records are skipped
/// during [`QuestionBank::build`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawQuestion {
    #[serde(default, alias = "thema", deserialize_with = "lenient")]
    pub topic: Option<String>,
    #[serde(default, alias = "vraag", deserialize_with = "lenient")]
    pub question_text: Option<String>,
    #[serde(default, alias = "opties", deserialize_with = "lenient_list")]
    pub options: Vec<String>,
    #[serde(default, alias = "antwoord", deserialize_with = "lenient")]
    pub correct_letter: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub difficulty: Option<f64>,
}

/// A value of the expected type, or anything else.
#[derive(Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Value(T),
    Other(IgnoredAny),
}

/// `null` and values of the wrong type read as `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<Lenient<T>>::deserialize(deserializer)? {
        Some(Lenient::Value(value)) => Some(value),
        Some(Lenient::Other(_)) | None => None,
    })
}

/// Like [`lenient`]; a missing list is empty and non-string entries are dropped.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items: Option<Vec<Lenient<String>>> = lenient(deserializer)?;
    Ok(items
        .unwrap_or_default()
        .into_iter()
        .filter_map(|item| match item {
            Lenient::Value(text) => Some(text),
            Lenient::Other(_) => None,
        })
        .collect())
}

/// What happened to the raw records during a build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BankStats {
    pub accepted: usize,
    /// Records without a topic or question text.
    pub incomplete: usize,
    /// Records whose `(topic, text)` was already seen.
    pub duplicates: usize,
    /// Accepted records whose answer letter was missing or unrecognised and
    /// fell back to the first choice.
    pub defaulted_answers: usize,
}

/// Deduplicated, immutable set of questions plus the sorted topic list.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    questions: Vec<Question>,
    topics: Vec<String>,
    stats: BankStats,
}

impl QuestionBank {
    /// Normalize raw records into a bank.
    ///
    /// Records missing a topic or text are skipped, the first record for each
    /// `(topic, text)` pair wins, and ids are assigned densely in that order.
    pub fn build(records: impl IntoIterator<Item = RawQuestion>) -> Self {
        let mut stats = BankStats::default();
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut questions = Vec::new();

        for record in records {
            let (Some(topic), Some(text)) = (
                non_empty(record.topic.as_deref()),
                non_empty(record.question_text.as_deref()),
            ) else {
                stats.incomplete += 1;
                continue;
            };

            if !seen.insert((topic.to_owned(), text.to_owned())) {
                stats.duplicates += 1;
                continue;
            }

            let correct_index = match record.correct_letter.as_deref().and_then(letter_index) {
                Some(index) => index,
                None => {
                    stats.defaulted_answers += 1;
                    0
                }
            };
            let choices = record
                .options
                .iter()
                .map(|choice| strip_choice_prefix(choice).to_owned())
                .collect();

            let id = QuestionId::new(questions.len() as u64);
            let question = Question::new(id, topic, text, choices, correct_index)
                .with_explanation(record.explanation)
                .with_difficulty(difficulty(record.difficulty));
            questions.push(question);
        }

        stats.accepted = questions.len();
        let mut topics: Vec<String> = questions.iter().map(|q| q.topic().to_owned()).collect();
        sort_topics(&mut topics);

        Self {
            questions,
            topics,
            stats,
        }
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// All topics, sorted and deduplicated.
    #[must_use]
    pub fn topics(&self) -> &[String] {
        &self.topics
    }

    #[must_use]
    pub fn stats(&self) -> BankStats {
        self.stats
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
    pub fn get(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(id.index()?)
    }

    /// Questions belonging to `topic`, in bank order.
    pub fn questions_in<'a>(&'a self, topic: &'a str) -> impl Iterator<Item = &'a Question> + 'a {
        self.questions.iter().filter(move |q| q.topic() == topic)
    }

    /// Number of questions available across `topics`.
    #[must_use]
    pub fn pool_size(&self, topics: &[String]) -> usize {
        self.questions
            .iter()
            .filter(|q| topics.iter().any(|t| t == q.topic()))
            .count()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Remove a leading `"a) "`-style label from a choice.
fn strip_choice_prefix(choice: &str) -> &str {
    let trimmed = choice.trim_start();
    let mut chars = trimmed.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(')')) if matches!(letter.to_ascii_lowercase(), 'a'..='d') => {
            chars.as_str().trim_start()
        }
        _ => choice,
    }
}

fn difficulty(raw: Option<f64>) -> u8 {
    match raw {
        Some(value) if value.is_finite() && value.fract() == 0.0 => {
            // Clamped first, so the cast cannot truncate.
            value.clamp(f64::from(MIN_DIFFICULTY), f64::from(MAX_DIFFICULTY)) as u8
        }
        _ => MIN_DIFFICULTY,
    }
}
