// src/quiz/registry.rs

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::quiz::session::QuizSession;

/// Live sessions keyed by id. Each session has its own lock, so requests for
/// different users never wait on each other.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<QuizSession>>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, session: QuizSession) -> Uuid {
        let id = session.id();
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(session)));
        id
    }

    pub async fn get(&self, id: Uuid) -> Option<Arc<Mutex<QuizSession>>> {
        self.sessions.read().await.get(&id).cloned()
    }

    /// Runs `f` against the session, or returns `None` if it does not exist.
    pub async fn with_session<T>(
        &self,
        id: Uuid,
        f: impl FnOnce(&mut QuizSession) -> T,
    ) -> Option<T> {
        let session = self.get(id).await?;
        let mut guard = session.lock().await;
        Some(f(&mut guard))
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    /// Drops sessions created more than `max_age` before `now`.
    pub async fn purge_older_than(&self, max_age: TimeDelta, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        let mut expired = Vec::new();
        for (id, session) in sessions.iter() {
            // A session busy with a request is in use, not expired.
            if let Ok(guard) = session.try_lock() {
                if now - guard.created_at() > max_age {
                    expired.push(*id);
                }
            }
        }
        for id in expired {
            sessions.remove(&id);
        }
        let purged = before - sessions.len();
        if purged > 0 {
            tracing::info!("Purged {} expired sessions", purged);
        }
        purged
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
