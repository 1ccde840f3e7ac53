// src/sources/mod.rs

pub mod cache;
pub mod local;
pub mod remote;
pub mod table;

use std::{fmt, time::Duration};

use async_trait::async_trait;

use crate::{config::Config, quiz::store::QuestionStore};

pub use cache::QuestionCache;
pub use local::LocalFileSource;
pub use remote::RemoteSheetSource;
pub use table::parse_table;

/// Failures while fetching or reading a question table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    Timeout(String),
    Network(String),
    /// Body could not be decoded or parsed as a table.
    Malformed(String),
    Io(String),
    /// Required columns absent. Never recovered by falling back.
    Schema(Vec<String>),
    /// The table had a header but no questions.
    Empty,
    /// Every configured source failed.
    Exhausted(Vec<String>),
}

impl LoadError {
    /// Whether the next source should be tried.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, LoadError::Schema(_) | LoadError::Exhausted(_))
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Timeout(msg) => write!(f, "Timeout loading questions: {}", msg),
            LoadError::Network(msg) => write!(f, "Network error loading questions: {}", msg),
            LoadError::Malformed(msg) => write!(f, "Malformed question table: {}", msg),
            LoadError::Io(msg) => write!(f, "Could not read question file: {}", msg),
            LoadError::Schema(missing) => {
                write!(f, "Missing required columns: {}", missing.join(", "))
            }
            LoadError::Empty => write!(f, "Question table contains no questions"),
            LoadError::Exhausted(reasons) => {
                write!(f, "Failed to load questions from all sources: {}", reasons.join("; "))
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Somewhere a CSV question table can be read from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Short label used in logs and the questions metadata.
    fn describe(&self) -> String;

    async fn fetch(&self) -> Result<String, LoadError>;
}

/// Tries each source in order until one yields a valid table.
pub struct QuestionLoader {
    sources: Vec<Box<dyn QuestionSource>>,
}

impl QuestionLoader {
    pub fn new(sources: Vec<Box<dyn QuestionSource>>) -> Self {
        Self { sources }
    }

    /// Remote sheet first (when configured), then the local file.
    pub fn from_config(config: &Config) -> Self {
        let mut sources: Vec<Box<dyn QuestionSource>> = Vec::new();

        if let Some(url) = &config.sheet_url {
            match RemoteSheetSource::new(url, Duration::from_secs(config.fetch_timeout_secs)) {
                Ok(remote) => sources.push(Box::new(remote)),
                Err(e) => tracing::error!("Remote question source disabled: {}", e),
            }
        }
        sources.push(Box::new(LocalFileSource::new(&config.local_questions_path)));

        Self::new(sources)
    }

    pub async fn load(&self) -> Result<QuestionStore, LoadError> {
        let mut failures = Vec::new();

        for source in &self.sources {
            let label = source.describe();
            let result = match source.fetch().await {
                Ok(text) => parse_table(&text),
                Err(e) => Err(e),
            };

            match result {
                Ok(questions) => {
                    tracing::info!("Loaded {} questions from {}", questions.len(), label);
                    return Ok(QuestionStore::new(questions, label));
                }
                Err(e) if e.is_recoverable() => {
                    tracing::warn!("{} unavailable, trying next source: {}", label, e);
                    failures.push(format!("{}: {}", label, e));
                }
                Err(e) => {
                    tracing::error!("{} rejected: {}", label, e);
                    return Err(e);
                }
            }
        }

        Err(LoadError::Exhausted(failures))
    }
}
