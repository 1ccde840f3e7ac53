// src/handlers/questions.rs

use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

use crate::{error::AppError, sources::QuestionCache};

/// Liveness probe.
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Returns the size, source and scenario groups of the current question table.
/// Loads the table if the cache is empty or expired.
pub async fn question_meta(
    State(cache): State<Arc<QuestionCache>>,
) -> Result<impl IntoResponse, AppError> {
    let store = cache.get().await?;
    Ok(Json(store.meta()))
}

/// Clears the question cache and reloads from the configured sources.
///
/// Running sessions keep the table they started with until restarted with
/// `preserve_loaded_data=false`.
pub async fn refresh_questions(
    State(cache): State<Arc<QuestionCache>>,
) -> Result<impl IntoResponse, AppError> {
    let store = cache.refresh().await?;
    tracing::info!("Question table refreshed: {} questions", store.len());
    Ok(Json(store.meta()))
}
