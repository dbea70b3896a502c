use crate::model::ids::QuestionId;

/// Number of choices a well-formed question carries.
pub const CHOICE_COUNT: usize = 4;

pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 3;

/// Immutable multiple-choice question owned by the bank.
///
/// Sessions hold clones, so nothing a session does can reach back into the
/// bank's copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    topic: String,
    text: String,
    choices: Vec<String>,
    correct_index: usize,
    explanation: Option<String>,
    difficulty: u8,
}

impl Question {
    #[must_use]
    pub fn new(
        id: QuestionId,
        topic: impl Into<String>,
        text: impl Into<String>,
        choices: Vec<String>,
        correct_index: usize,
    ) -> Self {
        Self {
            id,
            topic: topic.into(),
            text: text.into(),
            choices,
            correct_index,
            explanation: None,
            difficulty: MIN_DIFFICULTY,
        }
    }

    /// Attach an explanation; blank text is treated as none.
    #[must_use]
    pub fn with_explanation(mut self, explanation: Option<String>) -> Self {
        self.explanation = explanation
            .map(|text| text.trim().to_owned())
            .filter(|text| !text.is_empty());
        self
    }

    /// Set the difficulty, clamped to `MIN_DIFFICULTY..=MAX_DIFFICULTY`.
    #[must_use]
    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
        self
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn choices(&self) -> &[String] {
        &self.choices
    }

    #[must_use]
    pub fn choice(&self, index: usize) -> Option<&str> {
        self.choices.get(index).map(String::as_str)
    }

    #[must_use]
    pub fn correct_index(&self) -> usize {
        self.correct_index
    }

    #[must_use]
    pub fn explanation(&self) -> Option<&str> {
        self.explanation.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.correct_index
    }

    /// Choice text prefixed with its letter, e.g. `"b) Propolis"`.
    #[must_use]
    pub fn labelled_choice(&self, index: usize) -> Option<String> {
        let letter = choice_letter(index)?;
        self.choice(index).map(|text| format!("{letter}) {text}"))
    }

    /// The correct choice rendered with its letter.
    #[must_use]
    pub fn labelled_answer(&self) -> Option<String> {
        self.labelled_choice(self.correct_index)
    }
}

/// Letter shown in front of a choice (`0 -> 'a'`).
#[must_use]
pub fn choice_letter(index: usize) -> Option<char> {
    let offset = u8::try_from(index).ok().filter(|offset| *offset < 26)?;
    Some(char::from(b'a' + offset))
}

/// Maps an answer letter (`a`-`d`, any case) to its 0-based choice index.
#[must_use]
pub fn letter_index(letter: &str) -> Option<usize> {
    match letter.trim().to_ascii_lowercase().as_str() {
        "a" => Some(0),
        "b" => Some(1),
        "c" => Some(2),
        "d" => Some(3),
        _ => None,
    }
}
