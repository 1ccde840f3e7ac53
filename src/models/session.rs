// src/models/session.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{models::report::AccuracySummary, quiz::timer::TimerPhase};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Untimed, shuffled options, answers can be checked one at a time.
    #[default]
    Study,
    /// Countdown exam in column order, auto-submitted at expiry.
    Timed,
}

/// DTO for starting a session.
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub mode: QuizMode,
}

/// DTO for recording an answer.
#[derive(Debug, Deserialize, Validate)]
pub struct SelectAnswerRequest {
    /// 0-based question index.
    pub index: usize,
    #[validate(length(min = 1, max = 2000, message = "Option must be 1 to 2000 characters."))]
    pub option: String,
}

/// DTO for actions targeting a single question (jump, check).
#[derive(Debug, Deserialize)]
pub struct QuestionIndexRequest {
    pub index: usize,
}

/// Query parameters for restarting a session.
#[derive(Debug, Deserialize)]
pub struct RestartParams {
    #[serde(default = "default_true")]
    pub preserve_loaded_data: bool,
}

fn default_true() -> bool {
    true
}

/// Returned once when a session is created.
#[derive(Debug, Serialize)]
pub struct SessionCreatedResponse {
    pub token: String,
    #[serde(rename = "type")]
    pub token_type: &'static str,
    pub expires_in: u64,
    pub session: SessionView,
}

/// Everything a client needs to render the current state of a session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub mode: QuizMode,
    pub current_index: usize,
    pub total_questions: usize,
    pub question: QuestionView,
    pub progress: ProgressView,
    pub navigator: Vec<NavigatorEntry>,
    pub can_previous: bool,
    pub can_next: bool,
    pub can_submit: bool,
    pub submitted: bool,
    pub timer: Option<TimerView>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub index: usize,
    pub number: usize,
    /// Sanitized, non-empty paragraphs of the question text.
    pub paragraphs: Vec<String>,
    pub scenario: Option<ScenarioView>,
    pub options: Vec<String>,
    /// The recorded answer, if it is still one of `options`.
    pub selected: Option<String>,
    pub selected_index: Option<usize>,
    pub checked: bool,
    /// Present once the question is checked or the quiz is submitted.
    pub feedback: Option<AnswerFeedback>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioView {
    pub paragraphs: Vec<String>,
    /// 1-based position of the question inside its scenario.
    pub position: usize,
    pub total: usize,
    /// 1-based question numbers of the whole scenario, for scenario navigation.
    pub question_numbers: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub correct_answer: String,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    NotStarted,
    InProgress,
    Complete,
}

#[derive(Debug, Serialize)]
pub struct ProgressView {
    pub answered: usize,
    pub remaining: usize,
    pub total: usize,
    /// Fraction answered, 0.0 to 1.0.
    pub completion: f64,
    pub status: ProgressStatus,
}

#[derive(Debug, Serialize)]
pub struct NavigatorEntry {
    pub number: usize,
    pub answered: bool,
    pub current: bool,
    pub has_scenario: bool,
}

#[derive(Debug, Serialize)]
pub struct TimerView {
    pub phase: TimerPhase,
    pub duration_seconds: i64,
    pub remaining_seconds: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub time_up: bool,
    pub auto_submitted: bool,
}

/// All questions at once, for the one-page practice layout.
#[derive(Debug, Serialize)]
pub struct PracticeSheet {
    pub questions: Vec<QuestionView>,
    pub accuracy: AccuracySummary,
}
