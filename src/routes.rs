// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{questions, session},
    state::AppState,
    utils::jwt::session_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (questions, session creation, session actions).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (question cache, session registry, config).
pub fn create_router(state: AppState) -> Router {
    let origins: [HeaderValue; 2] = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let question_routes = Router::new()
        .route("/meta", get(questions::question_meta))
        .route("/refresh", post(questions::refresh_questions));

    // Every route below needs a session token.
    let session_routes = Router::new()
        .route(
            "/api/session",
            get(session::get_session).delete(session::end_session),
        )
        .route("/api/session/sheet", get(session::practice_sheet))
        .route("/api/session/answer", post(session::select_answer))
        .route("/api/session/check", post(session::check_answer))
        .route("/api/session/goto", post(session::go_to))
        .route("/api/session/next", post(session::next_question))
        .route("/api/session/previous", post(session::previous_question))
        .route("/api/session/restart", post(session::restart))
        .route("/api/session/submit", post(session::submit))
        .route("/api/session/timer/start", post(session::start_timer))
        .route("/api/session/results", get(session::get_results))
        .route("/api/session/results/export", get(session::export_results))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/api/health", get(questions::health))
        .route("/api/sessions", post(session::create_session))
        .nest("/api/questions", question_routes)
        .merge(session_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
