use std::collections::HashSet;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use services::sessions::RESUME_KEY;
use services::{
    Advance, BankService, Clock, PickOutcome, PickRejection, QuizLoopService, SessionError,
    SessionStore,
};
use storage::repository::{InMemoryStore, KeyValueStore};
use trainer_core::bank::{QuestionBank, RawQuestion};
use trainer_core::model::{Advice, Mode};
use trainer_core::time::fixed_now;

fn raw(topic: &str, n: usize) -> RawQuestion {
    RawQuestion {
        topic: Some(topic.to_owned()),
        question_text: Some(format!("{topic} question {n}")),
        options: vec![
            "a) first".into(),
            "b) second".into(),
            "c) third".into(),
            "d) fourth".into(),
        ],
        correct_letter: Some("b".into()),
        explanation: Some(format!("because {n}")),
        difficulty: None,
    }
}

fn bees_and_hives() -> QuestionBank {
    let records = (0..5)
        .map(|n| raw("Bees", n))
        .chain((0..5).map(|n| raw("Hives", n)));
    QuestionBank::build(records)
}

fn service(bank: QuestionBank, kv: &InMemoryStore) -> QuizLoopService {
    let kv: Arc<dyn KeyValueStore> = Arc::new(kv.clone());
    QuizLoopService::new(BankService::from_bank(bank), SessionStore::new(kv))
        .with_clock(Clock::fixed(fixed_now()))
}

fn topics(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_owned()).collect()
}

#[tokio::test]
async fn practice_draws_only_selected_topic() {
    let kv = InMemoryStore::new();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(3);

    assert_eq!(loop_svc.availability(&topics(&["Bees"])).await.unwrap(), 5);

    let session = loop_svc
        .start_practice(&topics(&["Bees"]), 3, &mut rng)
        .await
        .unwrap();

    assert_eq!(session.len(), 3);
    assert!(session.questions().iter().all(|q| q.topic() == "Bees"));
    let ids: HashSet<_> = session.questions().iter().map(|q| q.id()).collect();
    assert_eq!(ids.len(), 3);
    assert!(loop_svc.has_resume().await);
}

#[tokio::test]
async fn wrong_practice_pick_locks_and_allows_next() {
    let kv = InMemoryStore::new();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(9);
    let mut session = loop_svc
        .start_practice(&topics(&["Bees", "Hives"]), 4, &mut rng)
        .await
        .unwrap();

    assert!(!session.can_advance());
    assert_eq!(loop_svc.next(&mut session).await, Advance::Idle);

    let outcome = loop_svc.pick(&mut session, 0).await;
    assert_eq!(
        outcome,
        PickOutcome::Recorded {
            is_correct: false,
            feedback: true
        }
    );
    let again = loop_svc.pick(&mut session, 1).await;
    assert_eq!(again, PickOutcome::Rejected(PickRejection::Locked));

    let answer = session.current_answer().unwrap();
    assert!(answer.locked);
    assert!(!answer.is_correct);
    assert_eq!(answer.picked_index, 0);

    assert_eq!(loop_svc.next(&mut session).await, Advance::Moved(1));
}

#[tokio::test]
async fn exam_is_capped_by_pool_and_archived() {
    let kv = InMemoryStore::new();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(21);
    let mut session = loop_svc.start_exam(&mut rng).await.unwrap();

    assert_eq!(session.mode(), Mode::Exam);
    assert_eq!(session.len(), 10);
    let bees = session.questions().iter().filter(|q| q.topic() == "Bees").count();
    assert_eq!(bees, 5);
    assert!(!loop_svc.has_resume().await);

    // Change the first answer before moving on; only the last pick counts.
    loop_svc.pick(&mut session, 0).await;
    let outcome = loop_svc.pick(&mut session, 1).await;
    assert_eq!(
        outcome,
        PickOutcome::Recorded {
            is_correct: true,
            feedback: false
        }
    );

    let mut finished = None;
    for _ in 0..session.len() {
        if session.current_answer().is_none() {
            loop_svc.pick(&mut session, 3).await;
        }
        if let Advance::Finished(scorecard) = loop_svc.next(&mut session).await {
            finished = Some(scorecard);
        }
    }
    let scorecard = finished.expect("exam finished");

    assert_eq!(scorecard.report.score().correct, 1);
    assert_eq!(scorecard.report.score().total, 10);
    assert_eq!(scorecard.report.score().percent, 10);
    assert_eq!(scorecard.report.question_count(), 10);
    let review = scorecard.review.as_ref().unwrap();
    let missed: usize = review.iter().map(|group| group.questions.len()).sum();
    assert_eq!(missed, 9);
    assert_eq!(review[0].topic, "Bees");
    assert!(matches!(scorecard.advice, Advice::PracticeMore(_)));

    let history = loop_svc.history().await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].mode, Mode::Exam);
    assert_eq!(history[0].correct, 1);
    assert!(!loop_svc.has_resume().await);
}

#[tokio::test]
async fn practice_resumes_where_it_left_off() {
    let kv = InMemoryStore::new();
    let mut first = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(5);
    let mut session = first
        .start_practice(&topics(&["Hives"]), 4, &mut rng)
        .await
        .unwrap();
    first.pick(&mut session, 1).await;
    first.next(&mut session).await;
    first.pick(&mut session, 2).await;

    let mut second = service(bees_and_hives(), &kv);
    let resumed = second.resume().await.unwrap().expect("snapshot present");

    assert_eq!(resumed.mode(), Mode::Practice);
    assert_eq!(resumed.position(), 1);
    assert_eq!(resumed.answers(), session.answers());
    let expected: Vec<_> = session.questions().iter().map(|q| q.id()).collect();
    let actual: Vec<_> = resumed.questions().iter().map(|q| q.id()).collect();
    assert_eq!(actual, expected);
    assert_eq!(resumed.topics(), ["Hives"]);
    assert_eq!(resumed.progress().status_line(), "1 / 4 · correct: 1");
}

#[tokio::test]
async fn resume_discards_snapshot_for_changed_bank() {
    let kv = InMemoryStore::new();
    let mut rng = StdRng::seed_from_u64(1);
    let mut first = service(bees_and_hives(), &kv);
    first
        .start_practice(&topics(&["Hives"]), 5, &mut rng)
        .await
        .unwrap();

    let smaller = QuestionBank::build((0..2).map(|n| raw("Bees", n)));
    let mut second = service(smaller, &kv);
    assert!(second.resume().await.unwrap().is_none());
    assert!(!second.has_resume().await);
}

#[tokio::test]
async fn resume_discards_answers_that_do_not_fit() {
    let stored = [
        // pick past the last choice
        r#"{"timestamp":"2023-11-14T22:13:20Z","mode":"practice","questionIds":[0,1],"position":1,"answers":[{"questionId":0,"pickedIndex":7,"correctIndex":1,"isCorrect":false,"topic":"Bees","locked":true},null],"topics":["Bees"]}"#,
        // practice answers are always locked
        r#"{"timestamp":"2023-11-14T22:13:20Z","mode":"practice","questionIds":[0,1],"position":1,"answers":[{"questionId":0,"pickedIndex":1,"correctIndex":1,"isCorrect":true,"topic":"Bees","locked":false},null],"topics":["Bees"]}"#,
    ];
    for raw in stored {
        let kv = InMemoryStore::new();
        kv.set(RESUME_KEY, raw).await.unwrap();
        let mut loop_svc = service(bees_and_hives(), &kv);

        assert!(loop_svc.resume().await.unwrap().is_none(), "{raw}");
        assert!(!loop_svc.has_resume().await);
    }

    let kv = InMemoryStore::new();
    kv.set(
        RESUME_KEY,
        r#"{"timestamp":"2023-11-14T22:13:20Z","mode":"practice","questionIds":[0,1],"position":1,"answers":[{"questionId":0,"pickedIndex":1,"correctIndex":1,"isCorrect":true,"topic":"Bees","locked":true},null],"topics":["Bees"]}"#,
    )
    .await
    .unwrap();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let session = loop_svc.resume().await.unwrap().unwrap();
    assert_eq!(session.position(), 1);
    assert_eq!(session.correct_count(), 1);
}

#[tokio::test]
async fn going_home_clears_snapshot_without_archiving() {
    let kv = InMemoryStore::new();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(2);
    let mut session = loop_svc
        .start_practice(&topics(&["Bees"]), 2, &mut rng)
        .await
        .unwrap();
    loop_svc.pick(&mut session, 1).await;

    loop_svc.go_home(session).await;
    assert!(!loop_svc.has_resume().await);
    assert!(loop_svc.history().await.is_empty());
}

#[tokio::test]
async fn practice_completion_reports_and_clears_resume() {
    let kv = InMemoryStore::new();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(8);
    let mut session = loop_svc
        .start_practice(&topics(&["Bees", "Hives"]), 4, &mut rng)
        .await
        .unwrap();

    let mut finished = None;
    while finished.is_none() {
        let correct = session.current_question().unwrap().correct_index();
        loop_svc.pick(&mut session, correct).await;
        if let Advance::Finished(scorecard) = loop_svc.next(&mut session).await {
            finished = Some(scorecard);
        }
    }
    let scorecard = finished.unwrap();

    assert_eq!(scorecard.report.score().percent, 100);
    assert_eq!(scorecard.report.score().percent_label(), "100%");
    assert!(scorecard.review.is_none());
    assert_eq!(scorecard.advice, Advice::KeepItUp);
    assert!(session.is_finished());
    assert!(!loop_svc.has_resume().await);
    assert_eq!(loop_svc.history().await.len(), 1);

    loop_svc.reset_history().await;
    assert!(loop_svc.history().await.is_empty());
}

#[tokio::test]
async fn retry_same_reuses_selection_and_count() {
    let kv = InMemoryStore::new();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(4);

    assert!(loop_svc.retry_same(&mut rng).await.unwrap().is_none());
    assert_eq!(loop_svc.default_practice_count().await, 10);

    loop_svc
        .start_practice(&topics(&["Hives"]), 3, &mut rng)
        .await
        .unwrap();
    assert_eq!(loop_svc.default_practice_count().await, 3);

    let retry = loop_svc.retry_same(&mut rng).await.unwrap().unwrap();
    assert_eq!(retry.len(), 3);
    assert!(retry.questions().iter().all(|q| q.topic() == "Hives"));
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let kv = InMemoryStore::new();
    let mut loop_svc = service(bees_and_hives(), &kv);
    let mut rng = StdRng::seed_from_u64(0);

    let err = loop_svc.start_practice(&[], 5, &mut rng).await.unwrap_err();
    assert!(matches!(err, SessionError::NoTopics));

    let err = loop_svc
        .start_practice(&topics(&["Wasps"]), 5, &mut rng)
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::EmptyPool));
}
