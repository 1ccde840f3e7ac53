// src/sources/remote.rs

use std::{sync::LazyLock, time::Duration};

use async_trait::async_trait;
use regex::Regex;

use crate::sources::{LoadError, QuestionSource};

static SHEET_SHARE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://docs\.google\.com/spreadsheets/d/[^/]+)/edit.*$")
        .expect("sheet URL pattern is valid")
});

/// Rewrites a spreadsheet share link into its CSV export link.
/// Any other URL is returned unchanged.
pub fn csv_export_url(url: &str) -> String {
    SHEET_SHARE_URL
        .replace(url.trim(), "${1}/export?format=csv")
        .into_owned()
}

/// Published spreadsheet fetched over HTTP as CSV.
pub struct RemoteSheetSource {
    url: String,
    client: reqwest::Client,
}

impl RemoteSheetSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LoadError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LoadError::Network(e.to_string()))?;

        Ok(Self {
            url: csv_export_url(url),
            client,
        })
    }
}

#[async_trait]
impl QuestionSource for RemoteSheetSource {
    fn describe(&self) -> String {
        format!("remote sheet {}", self.url)
    }

    async fn fetch(&self) -> Result<String, LoadError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(classify)?;

        let bytes = response.bytes().await.map_err(classify)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| LoadError::Malformed(e.to_string()))
    }
}

fn classify(err: reqwest::Error) -> LoadError {
    if err.is_timeout() {
        LoadError::Timeout(err.to_string())
    } else if let Some(status) = err.status() {
        LoadError::Network(format!("HTTP {}", status))
    } else {
        LoadError::Network(err.to_string())
    }
}
