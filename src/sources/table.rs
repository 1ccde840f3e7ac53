// src/sources/table.rs

use csv::{ReaderBuilder, StringRecord};

use crate::{
    models::question::{HINT_COLUMN, QuestionRecord, REQUIRED_COLUMNS, SCENARIO_COLUMN},
    sources::LoadError,
};

/// Parses a CSV question table.
///
/// Header names are matched exactly (surrounding whitespace ignored). Short rows
/// are accepted and their missing cells read as empty strings.
pub fn parse_table(text: &str) -> Result<Vec<QuestionRecord>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.trim_start_matches('\u{feff}').as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Malformed(e.to_string()))?
        .clone();

    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|&name| column(name).is_none())
        .map(String::from)
        .collect();
    if !missing.is_empty() {
        return Err(LoadError::Schema(missing));
    }

    // Checked above.
    let required = REQUIRED_COLUMNS.map(|name| column(name).unwrap_or_default());
    let scenario = column(SCENARIO_COLUMN);
    let hint = column(HINT_COLUMN);

    let mut questions = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Malformed(format!("row {}: {}", row + 2, e)))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let question = QuestionRecord {
            text: cell(&record, Some(required[0])),
            options: [
                cell(&record, Some(required[1])),
                cell(&record, Some(required[2])),
                cell(&record, Some(required[3])),
                cell(&record, Some(required[4])),
            ],
            correct_answer: cell(&record, Some(required[5])),
            scenario: cell(&record, scenario),
            hint: cell(&record, hint),
        };

        if !question.correct_answer_listed() {
            tracing::warn!(
                "Question {}: correct answer '{}' is not one of its options",
                questions.len() + 1,
                question.correct_answer
            );
        }
        questions.push(question);
    }

    if questions.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(questions)
}

fn cell(record: &StringRecord, idx: Option<usize>) -> String {
    idx.and_then(|i| record.get(i)).unwrap_or("").to_string()
}
