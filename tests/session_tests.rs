// tests/session_tests.rs

use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

use chrono::{TimeDelta, Utc};
use quiz_backend::{
    config::NOT_ANSWERED,
    models::{
        question::QuestionRecord,
        session::{ProgressStatus, QuizMode},
    },
    quiz::{QuestionStore, QuizSession, SessionError, scoring, timer::TimerPhase},
};

fn plain_store(count: usize) -> Arc<QuestionStore> {
    let questions = (0..count)
        .map(|i| QuestionRecord::new(&format!("Question {}", i + 1), ["A", "B", "C", "D"], "A"))
        .collect();
    Arc::new(QuestionStore::new(questions, "test"))
}

fn scenario_store() -> Arc<QuestionStore> {
    Arc::new(QuestionStore::new(
        vec![
            QuestionRecord::new("First", ["A", "B", "C", "D"], "A").with_scenario("Case 1"),
            QuestionRecord::new("Second", ["A", "B", "C", "D"], "B")
                .with_scenario("Case 1")
                .with_hint("Think about B"),
            QuestionRecord::new("Third", ["A", "B", "", ""], "A"),
        ],
        "test",
    ))
}

#[test]
fn restart_clears_answers_position_and_submission() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(5), QuizMode::Study, 100);

    session.select_answer(0, "A", now).unwrap();
    session.select_answer(3, "B", now).unwrap();
    session.check(0).unwrap();
    session.go_to(3);
    session.submit(now).unwrap();

    session.restart();

    assert!(session.answers().is_empty());
    assert!(session.checked().is_empty());
    assert_eq!(session.current_index(), 0);
    assert!(!session.is_submitted());
}

#[test]
fn options_are_shuffled_once_per_session() {
    let mut session = QuizSession::new(plain_store(3), QuizMode::Study, 100);

    for idx in 0..3 {
        let first = session.options_for(idx).unwrap().to_vec();
        session.go_to(2);
        session.go_to(0);
        let second = session.options_for(idx).unwrap().to_vec();
        assert_eq!(first, second);

        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["A", "B", "C", "D"]);
    }
}

#[test]
fn timed_mode_keeps_column_order() {
    let mut session = QuizSession::new(scenario_store(), QuizMode::Timed, 100);
    assert_eq!(session.options_for(0).unwrap(), ["A", "B", "C", "D"]);
    assert_eq!(session.options_for(2).unwrap(), ["A", "B"]);
}

#[test]
fn selecting_again_overwrites_the_answer() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(2), QuizMode::Study, 100);

    session.select_answer(1, "C", now).unwrap();
    session.select_answer(1, "D", now).unwrap();

    assert_eq!(session.answers().len(), 1);
    assert_eq!(session.answers()[&1], "D");
}

#[test]
fn unknown_options_and_indices_are_rejected() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(2), QuizMode::Study, 100);

    assert_eq!(
        session.select_answer(0, "E", now),
        Err(SessionError::UnknownOption(0))
    );
    assert_eq!(
        session.select_answer(9, "A", now),
        Err(SessionError::QuestionOutOfRange(9))
    );
    assert!(session.answers().is_empty());
}

#[test]
fn navigation_stays_in_range() {
    let mut session = QuizSession::new(plain_store(3), QuizMode::Study, 100);

    assert!(!session.previous());
    assert!(session.next());
    assert!(session.next());
    assert!(!session.next());
    assert_eq!(session.current_index(), 2);

    assert!(!session.go_to(3));
    assert_eq!(session.current_index(), 2);

    let view = session.view(Utc::now());
    assert!(view.can_previous);
    assert!(!view.can_next);
}

#[test]
fn study_submit_requires_an_answer() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(3), QuizMode::Study, 100);

    assert!(!session.can_submit());
    assert_eq!(session.submit(now), Err(SessionError::NothingToSubmit));

    session.select_answer(0, "A", now).unwrap();
    assert!(session.can_submit());
    session.submit(now).unwrap();

    assert_eq!(session.submit(now), Err(SessionError::AlreadySubmitted));
    assert_eq!(
        session.select_answer(1, "A", now),
        Err(SessionError::AlreadySubmitted)
    );
}

#[test]
fn score_counts_exact_matches_over_all_questions() {
    let store = QuestionStore::new(
        vec![
            QuestionRecord::new("1", ["A", "B", "C", "D"], "A"),
            QuestionRecord::new("2", ["B", "X", "Y", "Z"], "B"),
            QuestionRecord::new("3", ["C", "D", "E", "F"], "C"),
            QuestionRecord::new("4", ["D", "E", "F", "G"], "D"),
        ],
        "test",
    );
    let answers: HashMap<usize, String> = [(0, "A"), (1, "X"), (2, "C")]
        .into_iter()
        .map(|(i, a)| (i, a.to_string()))
        .collect();

    let report = scoring::score(&store, &answers, &BTreeSet::new());

    assert_eq!(report.correct_count, 2);
    assert_eq!(report.percentage, 50.0);
    assert!(!report.passed);
    assert_eq!(report.answered_count, 3);
    assert_eq!(report.rows[3].user_answer, NOT_ANSWERED);
    assert!(!report.rows[3].is_correct);
}

#[test]
fn comparison_is_case_and_whitespace_sensitive() {
    let store = QuestionStore::new(
        vec![QuestionRecord::new("1", ["Yes", "yes", "Yes ", ""], "Yes")],
        "test",
    );
    for answer in ["yes", "Yes "] {
        let answers = HashMap::from([(0, answer.to_string())]);
        assert_eq!(scoring::score(&store, &answers, &BTreeSet::new()).correct_count, 0);
    }
}

#[test]
fn passing_needs_seventy_five_percent() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(4), QuizMode::Study, 100);
    for idx in 0..3 {
        session.select_answer(idx, "A", now).unwrap();
    }
    session.submit(now).unwrap();

    let report = session.score();
    assert_eq!(report.percentage, 75.0);
    assert!(report.passed);
}

#[test]
fn review_rows_carry_hints_only_when_wrong() {
    let now = Utc::now();
    let mut session = QuizSession::new(scenario_store(), QuizMode::Study, 100);
    session.select_answer(0, "A", now).unwrap();
    session.select_answer(1, "C", now).unwrap();
    session.submit(now).unwrap();

    let rows = session.score().rows;
    assert_eq!(rows[0].scenario.as_deref(), Some("Case 1"));
    assert!(rows[0].is_correct);
    assert_eq!(rows[1].hint.as_deref(), Some("Think about B"));
    assert_eq!(rows[2].scenario, None);
    assert_eq!(rows[2].user_answer, NOT_ANSWERED);
}

#[test]
fn accuracy_and_score_use_different_denominators() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(10), QuizMode::Study, 100);

    session.select_answer(0, "A", now).unwrap();
    session.select_answer(1, "A", now).unwrap();
    session.select_answer(2, "B", now).unwrap();
    for idx in 0..3 {
        session.check(idx).unwrap();
    }

    let accuracy = session.accuracy();
    assert_eq!(accuracy.checked_count, 3);
    assert_eq!(accuracy.correct_count, 2);
    let value = accuracy.accuracy.unwrap();
    assert!((value - 66.666).abs() < 0.01);
    assert_eq!(format!("{:.1}", value), "66.7");

    assert_eq!(session.score().percentage, 20.0);
}

#[test]
fn check_requires_answer_and_study_mode() {
    let now = Utc::now();
    let mut study = QuizSession::new(plain_store(2), QuizMode::Study, 100);
    assert_eq!(study.check(0), Err(SessionError::NotAnswered(0)));
    assert!(study.accuracy().accuracy.is_none());

    study.select_answer(0, "B", now).unwrap();
    assert_eq!(study.check(0), Ok(false));

    let mut timed = QuizSession::new(plain_store(2), QuizMode::Timed, 100);
    timed.select_answer(0, "A", now).unwrap();
    assert_eq!(timed.check(0), Err(SessionError::CheckUnavailable));
}

#[test]
fn first_answer_starts_the_clock() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(3), QuizMode::Timed, 100);
    assert_eq!(session.timer().unwrap().phase(false), TimerPhase::NotStarted);

    session.select_answer(0, "A", now).unwrap();
    session.select_answer(1, "A", now + TimeDelta::seconds(10)).unwrap();

    let timer = session.timer().unwrap();
    assert_eq!(timer.started_at(), Some(now));
    assert_eq!(timer.phase(false), TimerPhase::Running);
}

#[test]
fn expiry_auto_submits_exactly_once() {
    let start = Utc::now();
    let mut session = QuizSession::new(plain_store(3), QuizMode::Timed, 100);
    session.start_timer(start).unwrap();
    session.select_answer(0, "A", start).unwrap();

    let late = start + TimeDelta::seconds(100);
    let mut fired = 0;
    for offset in 0..5 {
        if session.poll(late + TimeDelta::seconds(offset)) {
            fired += 1;
        }
        let view = session.view(late + TimeDelta::seconds(offset));
        let timer = view.timer.unwrap();
        assert_eq!(timer.remaining_seconds, 0);
        assert!(timer.time_up);
        assert_eq!(timer.phase, TimerPhase::TimedOut);
    }

    assert_eq!(fired, 1);
    assert!(session.is_submitted());
    assert!(session.timer().unwrap().auto_submitted());
    assert_eq!(session.submit(late), Err(SessionError::TimeUp));
    assert_eq!(
        session.select_answer(1, "A", late),
        Err(SessionError::TimeUp)
    );
}

#[test]
fn manual_submit_before_expiry_is_final() {
    let start = Utc::now();
    let mut session = QuizSession::new(plain_store(3), QuizMode::Timed, 100);
    session.select_answer(0, "A", start).unwrap();
    session.submit(start + TimeDelta::seconds(50)).unwrap();

    assert!(!session.poll(start + TimeDelta::seconds(500)));
    let timer = session.timer().unwrap();
    assert!(!timer.auto_submitted());
    assert_eq!(timer.phase(true), TimerPhase::ManuallySubmitted);
}

#[test]
fn timed_results_wait_for_submission() {
    let now = Utc::now();
    let mut session = QuizSession::new(plain_store(2), QuizMode::Timed, 100);
    session.select_answer(0, "A", now).unwrap();
    assert!(matches!(
        session.results(now),
        Err(SessionError::ResultsUnavailable)
    ));

    session.submit(now).unwrap();
    let results = session.results(now).unwrap();
    assert_eq!(results.score.correct_count, 1);
}

#[test]
fn restart_resets_timer() {
    let start = Utc::now();
    let mut session = QuizSession::new(plain_store(2), QuizMode::Timed, 10);
    session.select_answer(0, "A", start).unwrap();
    session.poll(start + TimeDelta::seconds(20));
    assert!(session.is_submitted());

    session.restart();

    let timer = session.timer().unwrap();
    assert!(!timer.is_started());
    assert!(!timer.time_up());
    assert!(!timer.auto_submitted());
    assert!(!session.is_submitted());
    session.select_answer(1, "B", start + TimeDelta::seconds(30)).unwrap();
}

#[test]
fn view_reports_scenario_position_and_progress() {
    let now = Utc::now();
    let mut session = QuizSession::new(scenario_store(), QuizMode::Study, 100);
    session.select_answer(1, "B", now).unwrap();
    session.go_to(1);

    let view = session.view(now);
    let scenario = view.question.scenario.as_ref().unwrap();
    assert_eq!(scenario.position, 2);
    assert_eq!(scenario.total, 2);
    assert_eq!(scenario.question_numbers, vec![1, 2]);
    assert_eq!(view.question.selected.as_deref(), Some("B"));
    assert!(view.question.feedback.is_none());

    assert_eq!(view.progress.answered, 1);
    assert_eq!(view.progress.remaining, 2);
    assert_eq!(view.progress.status, ProgressStatus::InProgress);
    assert!(view.navigator[0].has_scenario);
    assert!(!view.navigator[2].has_scenario);
    assert!(view.navigator[1].current && view.navigator[1].answered);
}

#[test]
fn restart_with_smaller_table_resets_position() {
    let mut session = QuizSession::new(plain_store(5), QuizMode::Study, 100);
    session.go_to(4);

    session.restart_with(plain_store(2));
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.view(Utc::now()).total_questions, 2);
}

#[test]
fn practice_sheet_lists_every_question_with_feedback() {
    let now = Utc::now();
    let mut session = QuizSession::new(scenario_store(), QuizMode::Study, 100);
    session.select_answer(1, "A", now).unwrap();
    session.check(1).unwrap();

    let sheet = session.practice_sheet(now);
    assert_eq!(sheet.questions.len(), 3);
    let feedback = sheet.questions[1].feedback.as_ref().unwrap();
    assert!(!feedback.is_correct);
    assert_eq!(feedback.correct_answer, "B");
    assert_eq!(feedback.hint.as_deref(), Some("Think about B"));
    assert_eq!(sheet.accuracy.accuracy, Some(0.0));
}
