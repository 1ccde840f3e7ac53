// src/config.rs

use std::{env, path::PathBuf};

use dotenvy::dotenv;
use url::Url;

/// Pass mark for a submitted quiz, in percent.
pub const PASSING_SCORE_PERCENTAGE: f64 = 75.0;

/// Recorded as the user's answer for questions left blank at scoring time.
pub const NOT_ANSWERED: &str = "Not answered";

pub const DEFAULT_EXAM_DURATION_SECS: i64 = 3 * 60 * 60;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_SESSION_EXPIRATION_SECS: u64 = 4 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    /// Published spreadsheet URL (share or CSV export form).
    pub sheet_url: Option<String>,
    /// CSV file used when the sheet cannot be fetched.
    pub local_questions_path: PathBuf,
    pub fetch_timeout_secs: u64,
    pub cache_ttl_secs: u64,
    pub exam_duration_secs: i64,
    pub session_secret: String,
    pub session_expiration: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let sheet_url = env::var("QUESTIONS_SHEET_URL")
            .ok()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| match Url::parse(raw.trim()) {
                Ok(_) => Some(raw.trim().to_string()),
                Err(e) => {
                    tracing::warn!("Ignoring invalid QUESTIONS_SHEET_URL ({}): {}", raw, e);
                    None
                }
            });

        let local_questions_path = env::var("QUESTIONS_LOCAL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("questions.csv"));

        let session_secret = env::var("SESSION_SECRET").expect("SESSION_SECRET must be set");

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Self {
            sheet_url,
            local_questions_path,
            fetch_timeout_secs: parse_or("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS),
            cache_ttl_secs: parse_or("CACHE_TTL_SECS", DEFAULT_CACHE_TTL_SECS),
            exam_duration_secs: parse_or("EXAM_DURATION_SECS", DEFAULT_EXAM_DURATION_SECS),
            session_secret,
            session_expiration: parse_or("SESSION_EXPIRATION", DEFAULT_SESSION_EXPIRATION_SECS),
            port: parse_or("PORT", 3000),
            rust_log,
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{} has an unparsable value '{}', using default", key, raw);
            default
        }),
        Err(_) => default,
    }
}
