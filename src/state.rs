use std::sync::Arc;

use axum::extract::FromRef;

use crate::{config::Config, quiz::SessionRegistry, sources::QuestionCache};

#[derive(Clone)]
pub struct AppState {
    pub questions: Arc<QuestionCache>,
    pub sessions: SessionRegistry,
    pub config: Config,
}

impl FromRef<AppState> for Arc<QuestionCache> {
    fn from_ref(state: &AppState) -> Self {
        state.questions.clone()
    }
}

impl FromRef<AppState> for SessionRegistry {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
