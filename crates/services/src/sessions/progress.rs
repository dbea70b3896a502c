use trainer_core::model::Mode;

/// Aggregated view of session progress, useful for UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProgress {
    pub mode: Mode,
    pub position: usize,
    pub total: usize,
    /// Running correct count; only reported in practice.
    pub correct: Option<usize>,
    pub is_complete: bool,
}

impl SessionProgress {
    /// Share of the session already passed, in `0.0..=1.0`.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.position as f64 / self.total as f64
    }

    /// Status text such as `"3 / 10"` or `"3 / 10 · correct: 2"`.
    #[must_use]
    pub fn status_line(&self) -> String {
        match self.correct {
            Some(correct) => format!("{} / {} · correct: {correct}", self.position, self.total),
            None => format!("{} / {}", self.position, self.total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_depends_on_mode() {
        let practice = SessionProgress {
            mode: Mode::Practice,
            position: 3,
            total: 10,
            correct: Some(2),
            is_complete: false,
        };
        assert_eq!(practice.status_line(), "3 / 10 · correct: 2");
        assert!((practice.fraction() - 0.3).abs() < f64::EPSILON);

        let exam = SessionProgress {
            correct: None,
            mode: Mode::Exam,
            ..practice
        };
        assert_eq!(exam.status_line(), "3 / 10");
    }

    #[test]
    fn empty_progress_has_zero_fraction() {
        let progress = SessionProgress {
            mode: Mode::Exam,
            position: 0,
            total: 0,
            correct: None,
            is_complete: true,
        };
        assert_eq!(progress.fraction(), 0.0);
    }
}
