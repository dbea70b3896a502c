use std::ops::RangeInclusive;

use thiserror::Error;

pub const DEFAULT_EXAM_SIZE: usize = 30;
pub const DEFAULT_PRACTICE_COUNT: usize = 10;
pub const DEFAULT_PRACTICE_RANGE: RangeInclusive<usize> = 1..=200;
pub const DEFAULT_WEAK_THRESHOLD: u32 = 80;
pub const DEFAULT_MAX_WEAK_TOPICS: usize = 3;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("exam size must be > 0")]
    InvalidExamSize,

    #[error("practice count range must be non-empty and start above 0")]
    InvalidPracticeRange,

    #[error("default practice count {0} is outside the allowed range")]
    DefaultOutOfRange(usize),

    #[error("weak-topic threshold must be between 1 and 100")]
    InvalidWeakThreshold,
}

/// Tunables for building and scoring sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainerSettings {
    exam_size: usize,
    default_practice_count: usize,
    practice_range: RangeInclusive<usize>,
    weak_threshold: u32,
    max_weak_topics: usize,
}

impl TrainerSettings {
    /// Validate and build settings.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError` when any value is out of its allowed range.
    pub fn new(
        exam_size: usize,
        default_practice_count: usize,
        practice_range: RangeInclusive<usize>,
        weak_threshold: u32,
        max_weak_topics: usize,
    ) -> Result<Self, SettingsError> {
        if exam_size == 0 {
            return Err(SettingsError::InvalidExamSize);
        }
        if practice_range.is_empty() || *practice_range.start() == 0 {
            return Err(SettingsError::InvalidPracticeRange);
        }
        if !practice_range.contains(&default_practice_count) {
            return Err(SettingsError::DefaultOutOfRange(default_practice_count));
        }
        if !(1..=100).contains(&weak_threshold) {
            return Err(SettingsError::InvalidWeakThreshold);
        }
        Ok(Self {
            exam_size,
            default_practice_count,
            practice_range,
            weak_threshold,
            max_weak_topics,
        })
    }

    #[must_use]
    pub fn exam_size(&self) -> usize {
        self.exam_size
    }

    #[must_use]
    pub fn default_practice_count(&self) -> usize {
        self.default_practice_count
    }

    #[must_use]
    pub fn practice_range(&self) -> &RangeInclusive<usize> {
        &self.practice_range
    }

    /// Topics scoring strictly below this percentage count as weak.
    #[must_use]
    pub fn weak_threshold(&self) -> u32 {
        self.weak_threshold
    }

    #[must_use]
    pub fn max_weak_topics(&self) -> usize {
        self.max_weak_topics
    }

    #[must_use]
    pub fn clamp_practice_count(&self, count: usize) -> usize {
        count.clamp(*self.practice_range.start(), *self.practice_range.end())
    }
}

impl Default for TrainerSettings {
    fn default() -> Self {
        Self {
            exam_size: DEFAULT_EXAM_SIZE,
            default_practice_count: DEFAULT_PRACTICE_COUNT,
            practice_range: DEFAULT_PRACTICE_RANGE,
            weak_threshold: DEFAULT_WEAK_THRESHOLD,
            max_weak_topics: DEFAULT_MAX_WEAK_TOPICS,
        }
    }
}
