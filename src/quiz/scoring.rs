// src/quiz/scoring.rs

use std::collections::{BTreeSet, HashMap};

use crate::{
    config::{NOT_ANSWERED, PASSING_SCORE_PERCENTAGE},
    models::report::{AccuracySummary, ReviewRow, ScoreReport},
    quiz::store::QuestionStore,
};

/// Scores every question in the table.
///
/// Unanswered questions are scored with the "Not answered" sentinel. Answers are
/// compared verbatim with the stored correct answer.
pub fn score(
    store: &QuestionStore,
    answers: &HashMap<usize, String>,
    checked: &BTreeSet<usize>,
) -> ScoreReport {
    let total_questions = store.len();
    let mut correct_count = 0;

    let rows: Vec<ReviewRow> = store
        .questions()
        .iter()
        .enumerate()
        .map(|(idx, question)| {
            let user_answer = answers
                .get(&idx)
                .map(String::as_str)
                .unwrap_or(NOT_ANSWERED);
            let is_correct = question.is_correct(user_answer);
            if is_correct {
                correct_count += 1;
            }

            ReviewRow {
                number: idx + 1,
                scenario: question.scenario_key().map(str::to_string),
                question: question.text.clone(),
                user_answer: user_answer.to_string(),
                correct_answer: question.correct_answer.clone(),
                is_correct,
                checked: checked.contains(&idx),
                hint: if is_correct {
                    None
                } else {
                    question.hint().map(str::to_string)
                },
            }
        })
        .collect();

    let percentage = percent(correct_count, total_questions);

    ScoreReport {
        correct_count,
        total_questions,
        answered_count: answers.len(),
        percentage,
        pass_threshold: PASSING_SCORE_PERCENTAGE,
        passed: percentage >= PASSING_SCORE_PERCENTAGE,
        rows,
    }
}

/// Accuracy over the questions the user explicitly checked.
pub fn accuracy(
    store: &QuestionStore,
    answers: &HashMap<usize, String>,
    checked: &BTreeSet<usize>,
) -> AccuracySummary {
    let mut checked_count = 0;
    let mut correct_count = 0;

    for idx in checked {
        let Some(question) = store.get(*idx) else {
            continue;
        };
        checked_count += 1;
        let user_answer = answers.get(idx).map(String::as_str).unwrap_or("");
        if question.is_correct(user_answer) {
            correct_count += 1;
        }
    }

    AccuracySummary {
        checked_count,
        correct_count,
        total_questions: store.len(),
        accuracy: (checked_count > 0).then(|| percent(correct_count, checked_count)),
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}
