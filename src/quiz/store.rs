// src/quiz/store.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::models::question::{QuestionBankMeta, QuestionRecord, ScenarioSummary};

/// Scenario text mapped to the indices of the questions that share it.
pub type ScenarioGroups = HashMap<String, Vec<usize>>;

/// The loaded question table plus the scenario groups derived from it.
#[derive(Debug, Clone)]
pub struct QuestionStore {
    questions: Vec<QuestionRecord>,
    scenario_groups: ScenarioGroups,
    /// Scenario keys in order of first appearance.
    scenario_order: Vec<String>,
    source: String,
    loaded_at: DateTime<Utc>,
}

impl QuestionStore {
    pub fn new(questions: Vec<QuestionRecord>, source: impl Into<String>) -> Self {
        let scenario_groups = group_by_scenario(&questions);

        let mut scenario_order = Vec::with_capacity(scenario_groups.len());
        for question in &questions {
            if let Some(key) = question.scenario_key() {
                if !scenario_order.iter().any(|seen| seen == key) {
                    scenario_order.push(key.to_string());
                }
            }
        }

        Self {
            questions,
            scenario_groups,
            scenario_order,
            source: source.into(),
            loaded_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.questions.get(index)
    }

    pub fn questions(&self) -> &[QuestionRecord] {
        &self.questions
    }

    pub fn scenario_groups(&self) -> &ScenarioGroups {
        &self.scenario_groups
    }

    /// The group the question at `index` belongs to, if any.
    pub fn scenario_of(&self, index: usize) -> Option<(&str, &[usize])> {
        let key = self.get(index)?.scenario_key()?;
        self.scenario_groups
            .get_key_value(key)
            .map(|(k, members)| (k.as_str(), members.as_slice()))
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn meta(&self) -> QuestionBankMeta {
        QuestionBankMeta {
            total_questions: self.len(),
            source: self.source.clone(),
            loaded_at: self.loaded_at,
            scenarios: self
                .scenario_order
                .iter()
                .map(|key| ScenarioSummary {
                    scenario: key.clone(),
                    question_numbers: self.scenario_groups[key].iter().map(|i| i + 1).collect(),
                })
                .collect(),
        }
    }
}

/// Groups question indices by their trimmed scenario text.
///
/// Questions without a scenario are left out. Keys are compared verbatim after
/// trimming, so scenarios that differ in inner whitespace form separate groups.
pub fn group_by_scenario(questions: &[QuestionRecord]) -> ScenarioGroups {
    let mut groups: ScenarioGroups = HashMap::new();
    for (idx, question) in questions.iter().enumerate() {
        if let Some(key) = question.scenario_key() {
            groups.entry(key.to_string()).or_default().push(idx);
        }
    }
    groups
}
