// src/quiz/timer.rs

use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

/// Where a timed exam stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerPhase {
    NotStarted,
    Running,
    TimedOut,
    ManuallySubmitted,
}

/// Countdown for a timed exam.
///
/// There is no running clock: remaining time is derived from the stored start
/// instant whenever it is asked for. `time_up` and `auto_submitted` only ever
/// go from false to true; `reset` is the only way back.
#[derive(Debug, Clone)]
pub struct ExamTimer {
    duration: TimeDelta,
    started_at: Option<DateTime<Utc>>,
    time_up: bool,
    auto_submitted: bool,
}

impl ExamTimer {
    pub fn new(duration_secs: i64) -> Self {
        Self {
            duration: TimeDelta::seconds(duration_secs.max(0)),
            started_at: None,
            time_up: false,
            auto_submitted: false,
        }
    }

    /// Starts the countdown. Returns false if it was already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.started_at.is_some() {
            return false;
        }
        self.started_at = Some(now);
        true
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn duration(&self) -> TimeDelta {
        self.duration
    }

    /// Time left, never negative. An unstarted timer has its full duration left.
    pub fn remaining(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.started_at {
            Some(start) => (self.duration - (now - start)).max(TimeDelta::zero()),
            None => self.duration,
        }
    }

    /// Evaluates the countdown at `now`.
    ///
    /// Returns true exactly once: on the first check that finds the time used up
    /// while the exam is still open. The caller must then submit the exam.
    pub fn check(&mut self, now: DateTime<Utc>, submitted: bool) -> bool {
        if !self.is_started() {
            return false;
        }
        if !self.time_up && self.remaining(now) <= TimeDelta::zero() {
            self.time_up = true;
            tracing::info!("Exam time elapsed after {}s", self.duration.num_seconds());
        }
        if self.time_up && !submitted && !self.auto_submitted {
            self.auto_submitted = true;
            return true;
        }
        false
    }

    pub fn time_up(&self) -> bool {
        self.time_up
    }

    pub fn auto_submitted(&self) -> bool {
        self.auto_submitted
    }

    pub fn phase(&self, submitted: bool) -> TimerPhase {
        if self.auto_submitted {
            TimerPhase::TimedOut
        } else if submitted {
            TimerPhase::ManuallySubmitted
        } else if self.is_started() {
            TimerPhase::Running
        } else {
            TimerPhase::NotStarted
        }
    }

    pub fn reset(&mut self) {
        *self = Self {
            duration: self.duration,
            started_at: None,
            time_up: false,
            auto_submitted: false,
        };
    }
}
