//! Final tally, per-topic breakdown and weak-topic advice.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::model::{
    Advice, Answer, MissedQuestion, Mode, Question, Report, ReportAnswer, ReportId, ReviewGroup,
    Score, TopicScore, TrainerSettings, compare_topics, rounded_percent,
};

/// Borrowed view of a finished attempt.
#[derive(Debug, Clone, Copy)]
pub struct Attempt<'a> {
    pub mode: Mode,
    pub topics: &'a [String],
    pub questions: &'a [Question],
    /// One slot per question; `None` where nothing was picked.
    pub answers: &'a [Option<Answer>],
}

/// Everything the results screen needs. Only `report` is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scorecard {
    pub report: Report,
    pub per_topic: Vec<TopicScore>,
    pub advice: Advice,
    /// Wrong exam answers grouped by topic; `None` for practice, where
    /// feedback was already shown per question.
    pub review: Option<Vec<ReviewGroup>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringEngine {
    weak_threshold: u32,
    max_weak_topics: usize,
}

impl ScoringEngine {
    #[must_use]
    pub fn new(settings: &TrainerSettings) -> Self {
        Self {
            weak_threshold: settings.weak_threshold(),
            max_weak_topics: settings.max_weak_topics(),
        }
    }

    /// Score an attempt into a report stamped with `id` and `at`.
    #[must_use]
    pub fn score(&self, attempt: &Attempt<'_>, id: ReportId, at: DateTime<Utc>) -> Scorecard {
        let answered = || attempt.answers.iter().flatten();
        let correct = answered().filter(|a| a.is_correct).count();
        let score = Score::new(correct, attempt.questions.len());

        let answers = attempt
            .questions
            .iter()
            .enumerate()
            .map(|(index, question)| ReportAnswer {
                question_id: question.id(),
                is_correct: attempt
                    .answers
                    .get(index)
                    .and_then(Option::as_ref)
                    .is_some_and(|a| a.is_correct),
                topic: question.topic().to_owned(),
            })
            .collect();

        let per_topic = per_topic(answered());
        let advice = self.advice(&per_topic);
        let review = (attempt.mode == Mode::Exam).then(|| review_groups(attempt));

        let report = Report::new(
            id,
            attempt.mode,
            at,
            attempt.topics.to_vec(),
            answers,
            score,
        );

        Scorecard {
            report,
            per_topic,
            advice,
            review,
        }
    }

    fn advice(&self, per_topic: &[TopicScore]) -> Advice {
        let mut weak: Vec<&TopicScore> = per_topic
            .iter()
            .filter(|t| t.percent < self.weak_threshold)
            .collect();
        weak.sort_by(|a, b| {
            a.percent
                .cmp(&b.percent)
                .then_with(|| compare_topics(&a.topic, &b.topic))
        });
        let weak: Vec<String> = weak
            .into_iter()
            .take(self.max_weak_topics)
            .map(|t| t.topic.clone())
            .collect();

        if weak.is_empty() {
            Advice::KeepItUp
        } else {
            Advice::PracticeMore(weak)
        }
    }
}

/// Tally answered questions per topic, topics in reading order.
fn per_topic<'a>(answers: impl Iterator<Item = &'a Answer>) -> Vec<TopicScore> {
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    for answer in answers {
        let entry = tally.entry(answer.topic.as_str()).or_default();
        entry.1 += 1;
        if answer.is_correct {
            entry.0 += 1;
        }
    }

    let mut scores: Vec<TopicScore> = tally
        .into_iter()
        .map(|(topic, (good, total))| TopicScore {
            topic: topic.to_owned(),
            good,
            total,
            percent: rounded_percent(good, total),
        })
        .collect();
    scores.sort_by(|a, b| compare_topics(&a.topic, &b.topic));
    scores
}

fn review_groups(attempt: &Attempt<'_>) -> Vec<ReviewGroup> {
    let mut missed: Vec<(usize, &Question, &Answer)> = attempt
        .questions
        .iter()
        .enumerate()
        .filter_map(|(index, question)| {
            let answer = attempt.answers.get(index)?.as_ref()?;
            (!answer.is_correct).then_some((index, question, answer))
        })
        .collect();
    missed.sort_by(|a, b| compare_topics(a.1.topic(), b.1.topic()).then(a.0.cmp(&b.0)));

    let mut groups: Vec<ReviewGroup> = Vec::new();
    for (position, question, answer) in missed {
        let entry = MissedQuestion {
            question_id: question.id(),
            position,
            text: question.text().to_owned(),
            your_answer: question.labelled_choice(answer.picked_index),
            correct_answer: question.labelled_answer(),
        };
        match groups.last_mut() {
            Some(group) if group.topic == question.topic() => group.questions.push(entry),
            _ => groups.push(ReviewGroup {
                topic: question.topic().to_owned(),
                questions: vec![entry],
            }),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use crate::time::fixed_now;

    fn question(id: u64, topic: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            topic,
            format!("Q{id}"),
            vec!["w".into(), "x".into(), "y".into(), "z".into()],
            0,
        )
    }

    fn pick(q: &Question, choice: usize, mode: Mode) -> Option<Answer> {
        Some(Answer::record(q, choice, mode))
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new(&TrainerSettings::default())
    }

    #[test]
    fn score_counts_correct_answers() {
        let qs = vec![question(0, "Bees"), question(1, "Bees"), question(2, "Hives")];
        let answers = vec![
            pick(&qs[0], 0, Mode::Practice),
            pick(&qs[1], 2, Mode::Practice),
            pick(&qs[2], 0, Mode::Practice),
        ];
        let topics = vec!["Bees".to_string(), "Hives".to_string()];
        let attempt = Attempt {
            mode: Mode::Practice,
            topics: &topics,
            questions: &qs,
            answers: &answers,
        };

        let card = engine().score(&attempt, ReportId::random(), fixed_now());

        let score = card.report.score();
        assert_eq!(score.correct, 2);
        assert_eq!(score.total, 3);
        assert_eq!(score.percent, 67);
        assert_eq!(card.report.answers().len(), 3);
        assert!(!card.report.answers()[1].is_correct);
        assert!(card.review.is_none());

        assert_eq!(card.per_topic.len(), 2);
        assert_eq!(card.per_topic[0].topic, "Bees");
        assert_eq!((card.per_topic[0].good, card.per_topic[0].total), (1, 2));
        assert_eq!(card.per_topic[0].percent, 50);
        assert_eq!(card.advice, Advice::PracticeMore(vec!["Bees".into()]));
    }

    #[test]
    fn unanswered_questions_count_against_total() {
        let qs = vec![question(0, "Bees"), question(1, "Bees")];
        let answers = vec![pick(&qs[0], 0, Mode::Exam), None];
        let attempt = Attempt {
            mode: Mode::Exam,
            topics: &[],
            questions: &qs,
            answers: &answers,
        };
        let card = engine().score(&attempt, ReportId::random(), fixed_now());
        assert_eq!(card.report.score().percent, 50);
        // only answered questions enter the topic breakdown
        assert_eq!(card.per_topic[0].total, 1);
        assert_eq!(card.advice, Advice::KeepItUp);
    }

    #[test]
    fn weak_topics_are_capped_and_sorted() {
        let topics = ["A", "B", "C", "D", "E"];
        // correct picks per topic out of 4: A=3, B=0, C=2, D=1, E=4
        let good = [3, 0, 2, 1, 4];
        let mut qs = Vec::new();
        let mut answers = Vec::new();
        let mut id = 0;
        for (topic, good) in topics.iter().zip(good) {
            for n in 0..4 {
                let q = question(id, topic);
                answers.push(pick(&q, if n < good { 0 } else { 1 }, Mode::Exam));
                qs.push(q);
                id += 1;
            }
        }
        let attempt = Attempt {
            mode: Mode::Exam,
            topics: &[],
            questions: &qs,
            answers: &answers,
        };

        let card = engine().score(&attempt, ReportId::random(), fixed_now());

        let Advice::PracticeMore(weak) = card.advice else {
            panic!("expected weak topics");
        };
        assert_eq!(weak, vec!["B", "D", "C"]);
        let percents: Vec<u32> = weak
            .iter()
            .map(|t| card.per_topic.iter().find(|s| &s.topic == t).unwrap().percent)
            .collect();
        assert!(percents.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn exam_review_groups_misses_by_topic() {
        let qs = vec![
            question(0, "Varroa"),
            question(1, "Bees"),
            question(2, "Varroa"),
            question(3, "Bees"),
            question(4, "Bees"),
        ];
        let answers = vec![
            pick(&qs[0], 3, Mode::Exam),
            pick(&qs[1], 0, Mode::Exam),
            pick(&qs[2], 1, Mode::Exam),
            pick(&qs[3], 2, Mode::Exam),
            None,
        ];
        let attempt = Attempt {
            mode: Mode::Exam,
            topics: &[],
            questions: &qs,
            answers: &answers,
        };

        let review = engine()
            .score(&attempt, ReportId::random(), fixed_now())
            .review
            .unwrap();

        assert_eq!(review.len(), 2);
        assert_eq!(review[0].topic, "Bees");
        assert_eq!(review[0].questions.len(), 1);
        assert_eq!(review[0].questions[0].position, 3);
        assert_eq!(review[0].questions[0].your_answer.as_deref(), Some("c) y"));
        assert_eq!(review[0].questions[0].correct_answer.as_deref(), Some("a) w"));
        assert_eq!(review[1].topic, "Varroa");
        let positions: Vec<usize> = review[1].questions.iter().map(|m| m.position).collect();
        assert_eq!(positions, vec![0, 2]);
    }

    #[test]
    fn perfect_exam_has_empty_review() {
        let qs = vec![question(0, "Bees")];
        let answers = vec![pick(&qs[0], 0, Mode::Exam)];
        let attempt = Attempt {
            mode: Mode::Exam,
            topics: &[],
            questions: &qs,
            answers: &answers,
        };
        let card = engine().score(&attempt, ReportId::random(), fixed_now());
        assert_eq!(card.review, Some(Vec::new()));
        assert_eq!(card.report.score().percent_label(), "100%");
    }
}
