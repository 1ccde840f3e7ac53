// src/quiz/shuffle.rs

use std::collections::HashMap;

use rand::{Rng, seq::SliceRandom};

use crate::models::question::QuestionRecord;

/// How option lists are ordered the first time a question is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionOrder {
    Shuffled,
    /// Column order A, B, C, D.
    Natural,
}

/// Per-session option orderings, built on first access and kept until `clear`.
#[derive(Debug, Clone)]
pub struct ShuffleCache {
    order: OptionOrder,
    options: HashMap<usize, Vec<String>>,
}

impl ShuffleCache {
    pub fn new(order: OptionOrder) -> Self {
        Self {
            order,
            options: HashMap::new(),
        }
    }

    pub fn options_for(&mut self, index: usize, question: &QuestionRecord) -> &[String] {
        self.options_for_with(index, question, &mut rand::thread_rng())
    }

    /// Returns the ordering memoized for `index`, creating it with `rng` if absent.
    pub fn options_for_with<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        question: &QuestionRecord,
        rng: &mut R,
    ) -> &[String] {
        let order = self.order;
        self.options.entry(index).or_insert_with(|| {
            let mut options = question.available_options();
            if order == OptionOrder::Shuffled && options.len() > 1 {
                options.shuffle(rng);
            }
            options
        })
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn clear(&mut self) {
        self.options.clear();
    }
}
