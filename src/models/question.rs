// src/models/question.rs

use serde::{Deserialize, Serialize};

/// Text produced by spreadsheet exports for a missing cell.
pub const MISSING_PLACEHOLDER: &str = "nan";

/// Columns every question table must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "Question",
    "OptionA",
    "OptionB",
    "OptionC",
    "OptionD",
    "CorrectAnswer",
];

pub const SCENARIO_COLUMN: &str = "Scenario";
pub const HINT_COLUMN: &str = "Hint";

/// One row of the question table.
/// Identified by its position in the loaded table; never mutated after load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// The question text, possibly spanning several paragraphs.
    pub text: String,

    /// Raw option cells in column order (A, B, C, D). Missing cells are empty.
    pub options: [String; 4],

    /// Compared verbatim against the selected option.
    pub correct_answer: String,

    /// Raw scenario cell. Use `scenario_key` for grouping.
    pub scenario: String,

    /// Raw hint cell.
    pub hint: String,
}

impl QuestionRecord {
    pub fn new(text: &str, options: [&str; 4], correct_answer: &str) -> Self {
        Self {
            text: text.to_string(),
            options: options.map(str::to_string),
            correct_answer: correct_answer.to_string(),
            scenario: String::new(),
            hint: String::new(),
        }
    }

    pub fn with_scenario(mut self, scenario: &str) -> Self {
        self.scenario = scenario.to_string();
        self
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        self.hint = hint.to_string();
        self
    }

    /// Options that can be displayed, in column order.
    /// Blank cells and the missing-value placeholder are dropped.
    pub fn available_options(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|opt| is_present(opt))
            .cloned()
            .collect()
    }

    /// Trimmed scenario text, or `None` when the question stands alone.
    pub fn scenario_key(&self) -> Option<&str> {
        let trimmed = self.scenario.trim();
        is_present(trimmed).then_some(trimmed)
    }

    pub fn hint(&self) -> Option<&str> {
        let trimmed = self.hint.trim();
        is_present(trimmed).then_some(trimmed)
    }

    /// Whether the correct answer is one of the raw option cells.
    /// An empty correct answer is accepted.
    pub fn correct_answer_listed(&self) -> bool {
        self.correct_answer.is_empty() || self.options.iter().any(|o| o == &self.correct_answer)
    }

    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

fn is_present(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value != MISSING_PLACEHOLDER
}

/// Summary of the loaded table, returned by the questions metadata endpoint.
#[derive(Debug, Serialize)]
pub struct QuestionBankMeta {
    pub total_questions: usize,
    pub source: String,
    pub loaded_at: chrono::DateTime<chrono::Utc>,
    pub scenarios: Vec<ScenarioSummary>,
}

#[derive(Debug, Serialize)]
pub struct ScenarioSummary {
    pub scenario: String,
    /// 1-based question numbers, in table order.
    pub question_numbers: Vec<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_and_blank_options_are_dropped() {
        let q = QuestionRecord::new("Q", ["A", "", "nan", "  "], "A");
        assert_eq!(q.available_options(), vec!["A".to_string()]);
    }

    #[test]
    fn padded_placeholder_is_still_missing() {
        let q = QuestionRecord::new("Q", ["A", "  ", "nan", " nan "], "A");
        assert_eq!(q.available_options(), vec!["A".to_string()]);
    }

    #[test]
    fn scenario_key_trims_and_rejects_placeholder() {
        let q = QuestionRecord::new("Q", ["A", "B", "", ""], "A").with_scenario("  Case 1 \n");
        assert_eq!(q.scenario_key(), Some("Case 1"));

        let q = q.with_scenario("nan");
        assert_eq!(q.scenario_key(), None);
    }

    #[test]
    fn correct_answer_must_match_a_raw_option_exactly() {
        let q = QuestionRecord::new("Q", ["Yes", "No", "", ""], "yes");
        assert!(!q.correct_answer_listed());
        assert!(QuestionRecord::new("Q", ["Yes", "No", "", ""], "").correct_answer_listed());
    }
}
