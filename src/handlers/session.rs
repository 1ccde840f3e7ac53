// src/handlers/session.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{TimeDelta, Utc};
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        report::ExportRow,
        session::{
            CreateSessionRequest, QuestionIndexRequest, RestartParams, SelectAnswerRequest,
            SessionCreatedResponse,
        },
    },
    quiz::{QuizSession, SessionError, SessionRegistry},
    state::AppState,
    utils::jwt::{SessionClaims, sign_session_token},
};

/// Runs `f` on the session named by the token claims.
async fn with_session<T>(
    sessions: &SessionRegistry,
    claims: &SessionClaims,
    f: impl FnOnce(&mut QuizSession) -> T,
) -> Result<T, AppError> {
    let id = claims.session_id()?;
    sessions
        .with_session(id, f)
        .await
        .ok_or_else(|| AppError::NotFound("Session not found or expired".to_string()))
}

/// Starts a new quiz session.
///
/// * Loads the question table through the cache (fails closed with 503).
/// * Purges sessions older than the token lifetime.
/// * Returns a bearer token for all `/api/session` routes and the first view.
pub async fn create_session(
    State(state): State<AppState>,
    Json(req): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.questions.get().await?;
    let now = Utc::now();

    let max_age = TimeDelta::seconds(state.config.session_expiration as i64);
    state.sessions.purge_older_than(max_age, now).await;

    let mut session = QuizSession::new(store, req.mode, state.config.exam_duration_secs);
    let view = session.view(now);
    let id = state.sessions.insert(session).await;

    let token = sign_session_token(
        id,
        &state.config.session_secret,
        state.config.session_expiration,
    )?;

    tracing::info!("Session {} started in {:?} mode", id, req.mode);

    Ok((
        StatusCode::CREATED,
        Json(SessionCreatedResponse {
            token,
            token_type: "Bearer",
            expires_in: state.config.session_expiration,
            session: view,
        }),
    ))
}

/// Current view of the session. Also advances the exam timer.
pub async fn get_session(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let view = with_session(&sessions, &claims, |s| s.view(now)).await?;
    Ok(Json(view))
}

/// Ends the session and discards its state.
pub async fn end_session(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let id = claims.session_id()?;
    if !sessions.remove(id).await {
        return Err(AppError::NotFound("Session not found or expired".to_string()));
    }
    tracing::info!("Session {} ended", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Every question at once, with options and any feedback.
pub async fn practice_sheet(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let sheet = with_session(&sessions, &claims, |s| s.practice_sheet(now)).await?;
    Ok(Json(sheet))
}

/// Records the selected option for a question.
pub async fn select_answer(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let now = Utc::now();
    let view = with_session(&sessions, &claims, |s| {
        s.select_answer(req.index, &req.option, now)?;
        Ok::<_, SessionError>(s.view(now))
    })
    .await??;

    Ok(Json(view))
}

/// Checks one answer (study mode) and reveals its feedback.
pub async fn check_answer(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<QuestionIndexRequest>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let view = with_session(&sessions, &claims, |s| {
        s.check(req.index)?;
        s.go_to(req.index);
        Ok::<_, SessionError>(s.view(now))
    })
    .await??;

    Ok(Json(view))
}

/// Jumps to a question. Out-of-range targets leave the position unchanged.
pub async fn go_to(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
    Json(req): Json<QuestionIndexRequest>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let view = with_session(&sessions, &claims, |s| {
        if !s.go_to(req.index) {
            tracing::debug!("Ignoring jump to question index {}", req.index);
        }
        s.view(now)
    })
    .await?;

    Ok(Json(view))
}

pub async fn next_question(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let view = with_session(&sessions, &claims, |s| {
        s.next();
        s.view(now)
    })
    .await?;
    Ok(Json(view))
}

pub async fn previous_question(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let view = with_session(&sessions, &claims, |s| {
        s.previous();
        s.view(now)
    })
    .await?;
    Ok(Json(view))
}

/// Restarts the quiz.
///
/// With `preserve_loaded_data=false` the question table is reloaded first and
/// the session moves onto the fresh table.
pub async fn restart(
    State(state): State<AppState>,
    Extension(claims): Extension<SessionClaims>,
    Query(params): Query<RestartParams>,
) -> Result<impl IntoResponse, AppError> {
    // Look the session up before touching the shared cache.
    let session = state
        .sessions
        .get(claims.session_id()?)
        .await
        .ok_or_else(|| AppError::NotFound("Session not found or expired".to_string()))?;

    let reloaded = if params.preserve_loaded_data {
        None
    } else {
        Some(state.questions.refresh().await?)
    };

    let mut session = session.lock().await;
    match reloaded {
        Some(store) => session.restart_with(store),
        None => session.restart(),
    }
    tracing::info!("Session {} restarted", session.id());

    Ok(Json(session.view(Utc::now())))
}

/// Starts the exam countdown explicitly (timed mode).
pub async fn start_timer(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let view = with_session(&sessions, &claims, |s| {
        if s.start_timer(now)? {
            tracing::info!("Session {} timer started", s.id());
        }
        Ok::<_, SessionError>(s.view(now))
    })
    .await??;

    Ok(Json(view))
}

/// Submits the quiz and returns the score report.
pub async fn submit(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let results = with_session(&sessions, &claims, |s| {
        s.submit(now)?;
        s.results(now)
    })
    .await??;

    Ok(Json(results))
}

/// Score report and check-as-you-go accuracy.
pub async fn get_results(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let results = with_session(&sessions, &claims, |s| s.results(now)).await??;
    Ok(Json(results))
}

/// Downloads the review table as CSV.
pub async fn export_results(
    State(sessions): State<SessionRegistry>,
    Extension(claims): Extension<SessionClaims>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let results = with_session(&sessions, &claims, |s| s.results(now)).await??;

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &results.score.rows {
        writer.serialize(ExportRow::from(row))?;
    }
    let body = writer
        .into_inner()
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"quiz_results.csv\"",
            ),
        ],
        body,
    ))
}
