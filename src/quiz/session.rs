// src/quiz/session.rs

use std::{
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    models::{
        report::{AccuracySummary, ResultsResponse, ScoreReport},
        session::{
            AnswerFeedback, NavigatorEntry, PracticeSheet, ProgressStatus, ProgressView,
            QuestionView, QuizMode, ScenarioView, SessionView, TimerView,
        },
    },
    quiz::{
        scoring,
        shuffle::{OptionOrder, ShuffleCache},
        store::QuestionStore,
        timer::ExamTimer,
    },
    utils::html::paragraphs,
};

/// Rule violations raised by session actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    AlreadySubmitted,
    /// The exam ran out of time and was submitted automatically.
    TimeUp,
    NothingToSubmit,
    QuestionOutOfRange(usize),
    UnknownOption(usize),
    NotAnswered(usize),
    CheckUnavailable,
    TimerUnavailable,
    /// Timed exams reveal nothing before submission.
    ResultsUnavailable,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AlreadySubmitted => write!(f, "Quiz has already been submitted"),
            SessionError::TimeUp => write!(f, "Time is up, the exam was submitted automatically"),
            SessionError::NothingToSubmit => write!(f, "Answer at least one question before submitting"),
            SessionError::QuestionOutOfRange(idx) => write!(f, "Question {} does not exist", idx + 1),
            SessionError::UnknownOption(idx) => {
                write!(f, "Option is not one of the choices for question {}", idx + 1)
            }
            SessionError::NotAnswered(idx) => write!(f, "Question {} has not been answered", idx + 1),
            SessionError::CheckUnavailable => write!(f, "Answers cannot be checked in timed mode"),
            SessionError::TimerUnavailable => write!(f, "Study sessions have no timer"),
            SessionError::ResultsUnavailable => write!(f, "Submit the exam to see results"),
        }
    }
}

impl std::error::Error for SessionError {}

/// The mutable state of one user's quiz.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    mode: QuizMode,
    store: Arc<QuestionStore>,
    current_index: usize,
    answers: HashMap<usize, String>,
    checked: BTreeSet<usize>,
    shuffle: ShuffleCache,
    submitted: bool,
    timer: Option<ExamTimer>,
    created_at: DateTime<Utc>,
}

impl QuizSession {
    pub fn new(store: Arc<QuestionStore>, mode: QuizMode, exam_duration_secs: i64) -> Self {
        let (order, timer) = match mode {
            QuizMode::Study => (OptionOrder::Shuffled, None),
            QuizMode::Timed => (OptionOrder::Natural, Some(ExamTimer::new(exam_duration_secs))),
        };

        Self {
            id: Uuid::new_v4(),
            mode,
            store,
            current_index: 0,
            answers: HashMap::new(),
            checked: BTreeSet::new(),
            shuffle: ShuffleCache::new(order),
            submitted: false,
            timer,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> QuizMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<QuestionStore> {
        &self.store
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &HashMap<usize, String> {
        &self.answers
    }

    pub fn checked(&self) -> &BTreeSet<usize> {
        &self.checked
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn timer(&self) -> Option<&ExamTimer> {
        self.timer.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Evaluates the exam timer at `now`, submitting the quiz if it just ran out.
    /// Returns true when this call performed the automatic submission.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.timer.as_mut() else {
            return false;
        };
        if timer.check(now, self.submitted) {
            self.submitted = true;
            tracing::info!(
                "Session {} auto-submitted with {}/{} answered",
                self.id,
                self.answers.len(),
                self.store.len()
            );
            return true;
        }
        false
    }

    /// The option ordering for `index`, fixed on first access.
    pub fn options_for(&mut self, index: usize) -> Result<&[String], SessionError> {
        let question = self
            .store
            .get(index)
            .ok_or(SessionError::QuestionOutOfRange(index))?;
        Ok(self.shuffle.options_for(index, question))
    }

    /// Records `option` as the answer to `index`, replacing any earlier choice.
    /// In timed mode the first answer starts the clock.
    pub fn select_answer(
        &mut self,
        index: usize,
        option: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        self.ensure_open(now)?;

        if !self.options_for(index)?.iter().any(|o| o == option) {
            return Err(SessionError::UnknownOption(index));
        }

        self.answers.insert(index, option.to_string());

        if let Some(timer) = self.timer.as_mut() {
            if timer.start(now) {
                tracing::info!("Session {} timer started by first answer", self.id);
            }
        }
        Ok(())
    }

    /// Marks `index` as checked and returns whether its answer is correct.
    pub fn check(&mut self, index: usize) -> Result<bool, SessionError> {
        if self.mode == QuizMode::Timed {
            return Err(SessionError::CheckUnavailable);
        }
        let question = self
            .store
            .get(index)
            .ok_or(SessionError::QuestionOutOfRange(index))?;
        let answer = self
            .answers
            .get(&index)
            .ok_or(SessionError::NotAnswered(index))?;

        let is_correct = question.is_correct(answer);
        self.checked.insert(index);
        Ok(is_correct)
    }

    /// Moves to `index`. Out-of-range targets are ignored.
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.store.len() {
            self.current_index = index;
            true
        } else {
            false
        }
    }

    pub fn next(&mut self) -> bool {
        self.go_to(self.current_index + 1)
    }

    pub fn previous(&mut self) -> bool {
        match self.current_index.checked_sub(1) {
            Some(index) => self.go_to(index),
            None => false,
        }
    }

    pub fn start_timer(&mut self, now: DateTime<Utc>) -> Result<bool, SessionError> {
        if self.timer.is_none() {
            return Err(SessionError::TimerUnavailable);
        }
        self.ensure_open(now)?;
        Ok(self.timer.as_mut().is_some_and(|timer| timer.start(now)))
    }

    pub fn can_submit(&self) -> bool {
        if self.submitted {
            return false;
        }
        match self.mode {
            QuizMode::Study => !self.answers.is_empty(),
            QuizMode::Timed => true,
        }
    }

    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.ensure_open(now)?;
        if self.mode == QuizMode::Study && self.answers.is_empty() {
            return Err(SessionError::NothingToSubmit);
        }
        self.submitted = true;
        tracing::info!(
            "Session {} submitted with {}/{} answered",
            self.id,
            self.answers.len(),
            self.store.len()
        );
        Ok(())
    }

    /// Clears answers, checks, option orderings, position and timer.
    pub fn restart(&mut self) {
        self.current_index = 0;
        self.answers.clear();
        self.checked.clear();
        self.shuffle.clear();
        self.submitted = false;
        if let Some(timer) = self.timer.as_mut() {
            timer.reset();
        }
    }

    /// Restarts on a freshly loaded question table.
    pub fn restart_with(&mut self, store: Arc<QuestionStore>) {
        self.store = store;
        self.restart();
    }

    pub fn score(&self) -> ScoreReport {
        scoring::score(&self.store, &self.answers, &self.checked)
    }

    pub fn accuracy(&self) -> AccuracySummary {
        scoring::accuracy(&self.store, &self.answers, &self.checked)
    }

    /// Score and accuracy at `now`. Timed exams must be submitted first.
    pub fn results(&mut self, now: DateTime<Utc>) -> Result<ResultsResponse, SessionError> {
        self.poll(now);
        if self.mode == QuizMode::Timed && !self.submitted {
            return Err(SessionError::ResultsUnavailable);
        }
        Ok(ResultsResponse {
            submitted: self.submitted,
            score: self.score(),
            accuracy: self.accuracy(),
        })
    }

    /// Builds the render state at `now`, after evaluating the timer.
    pub fn view(&mut self, now: DateTime<Utc>) -> SessionView {
        self.poll(now);

        // The table may have shrunk underneath a stale position.
        if self.current_index >= self.store.len() {
            self.current_index = 0;
        }

        let total = self.store.len();
        let current = self.current_index;
        let question = self.question_view(current);

        let navigator = (0..total)
            .map(|idx| NavigatorEntry {
                number: idx + 1,
                answered: self.answers.contains_key(&idx),
                current: idx == current,
                has_scenario: self.store.get(idx).is_some_and(|q| q.scenario_key().is_some()),
            })
            .collect();

        let timer = self.timer.as_ref().map(|timer| TimerView {
            phase: timer.phase(self.submitted),
            duration_seconds: timer.duration().num_seconds(),
            remaining_seconds: timer.remaining(now).num_seconds(),
            started_at: timer.started_at(),
            time_up: timer.time_up(),
            auto_submitted: timer.auto_submitted(),
        });

        SessionView {
            session_id: self.id,
            mode: self.mode,
            current_index: current,
            total_questions: total,
            question,
            progress: self.progress(),
            navigator,
            can_previous: current > 0,
            can_next: current + 1 < total,
            can_submit: self.can_submit(),
            submitted: self.submitted,
            timer,
        }
    }

    /// Every question with its options, for the one-page practice layout.
    pub fn practice_sheet(&mut self, now: DateTime<Utc>) -> PracticeSheet {
        self.poll(now);
        let questions = (0..self.store.len())
            .map(|idx| self.question_view(idx))
            .collect();
        PracticeSheet {
            questions,
            accuracy: self.accuracy(),
        }
    }

    fn question_view(&mut self, index: usize) -> QuestionView {
        let store = Arc::clone(&self.store);
        let Some(record) = store.get(index) else {
            return QuestionView {
                index,
                number: index + 1,
                paragraphs: Vec::new(),
                scenario: None,
                options: Vec::new(),
                selected: None,
                selected_index: None,
                checked: false,
                feedback: None,
            };
        };

        let options = self.shuffle.options_for(index, record).to_vec();

        // A stored answer missing from the options is shown as no selection.
        let selected_index = self
            .answers
            .get(&index)
            .and_then(|answer| options.iter().position(|o| o == answer));
        let selected = selected_index.map(|pos| options[pos].clone());

        let scenario = store.scenario_of(index).map(|(text, members)| ScenarioView {
            paragraphs: paragraphs(text),
            position: members.iter().position(|&m| m == index).map_or(0, |p| p + 1),
            total: members.len(),
            question_numbers: members.iter().map(|m| m + 1).collect(),
        });

        let checked = self.checked.contains(&index);
        let feedback = (checked || self.submitted).then(|| {
            let answer = self.answers.get(&index).map(String::as_str).unwrap_or("");
            let is_correct = record.is_correct(answer);
            AnswerFeedback {
                is_correct,
                correct_answer: record.correct_answer.clone(),
                hint: if is_correct {
                    None
                } else {
                    record.hint().map(str::to_string)
                },
            }
        });

        QuestionView {
            index,
            number: index + 1,
            paragraphs: paragraphs(&record.text),
            scenario,
            options,
            selected,
            selected_index,
            checked,
            feedback,
        }
    }

    fn progress(&self) -> ProgressView {
        let total = self.store.len();
        let answered = self.answers.len();
        let status = if answered == 0 {
            ProgressStatus::NotStarted
        } else if answered >= total {
            ProgressStatus::Complete
        } else {
            ProgressStatus::InProgress
        };

        ProgressView {
            answered,
            remaining: total.saturating_sub(answered),
            total,
            completion: if total == 0 {
                0.0
            } else {
                answered as f64 / total as f64
            },
            status,
        }
    }

    fn ensure_open(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        self.poll(now);
        if !self.submitted {
            return Ok(());
        }
        if self.timer.as_ref().is_some_and(ExamTimer::auto_submitted) {
            Err(SessionError::TimeUp)
        } else {
            Err(SessionError::AlreadySubmitted)
        }
    }
}
