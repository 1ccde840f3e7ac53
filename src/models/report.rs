// src/models/report.rs

use serde::Serialize;

/// Result of scoring a session against the full question table.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub correct_count: usize,
    pub total_questions: usize,
    pub answered_count: usize,
    /// Correct answers over all questions, in percent.
    pub percentage: f64,
    pub pass_threshold: f64,
    pub passed: bool,
    pub rows: Vec<ReviewRow>,
}

/// One line of the post-submission review.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewRow {
    /// 1-based.
    pub number: usize,
    pub scenario: Option<String>,
    pub question: String,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub checked: bool,
    /// Only present for incorrect rows.
    pub hint: Option<String>,
}

/// Check-as-you-go summary. Only checked questions count.
#[derive(Debug, Clone, Serialize)]
pub struct AccuracySummary {
    pub checked_count: usize,
    pub correct_count: usize,
    pub total_questions: usize,
    /// Correct over checked, in percent. `None` until something is checked.
    pub accuracy: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub submitted: bool,
    pub score: ScoreReport,
    pub accuracy: AccuracySummary,
}

/// Row layout of the downloadable results table.
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    #[serde(rename = "Question Number")]
    pub number: usize,
    #[serde(rename = "Question")]
    pub question: &'a str,
    #[serde(rename = "Your Answer")]
    pub user_answer: &'a str,
    #[serde(rename = "Correct Answer")]
    pub correct_answer: &'a str,
    #[serde(rename = "Correct")]
    pub is_correct: bool,
    #[serde(rename = "Checked")]
    pub checked: bool,
    #[serde(rename = "Scenario")]
    pub scenario: &'a str,
}

impl<'a> From<&'a ReviewRow> for ExportRow<'a> {
    fn from(row: &'a ReviewRow) -> Self {
        Self {
            number: row.number,
            question: &row.question,
            user_answer: &row.user_answer,
            correct_answer: &row.correct_answer,
            is_correct: row.is_correct,
            checked: row.checked,
            scenario: row.scenario.as_deref().unwrap_or(""),
        }
    }
}
