// src/sources/local.rs

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::sources::{LoadError, QuestionSource};

/// CSV question table on disk.
pub struct LocalFileSource {
    path: PathBuf,
}

impl LocalFileSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl QuestionSource for LocalFileSource {
    fn describe(&self) -> String {
        format!("local file {}", self.path.display())
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| LoadError::Io(format!("{}: {}", self.path.display(), e)))
    }
}
