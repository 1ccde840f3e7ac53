// src/sources/cache.rs

use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tokio::sync::RwLock;

use crate::{
    quiz::store::QuestionStore,
    sources::{LoadError, QuestionLoader},
};

struct CachedStore {
    store: Arc<QuestionStore>,
    fetched_at: Instant,
}

/// Shared question table with a time-to-live.
///
/// Sessions hold their own `Arc` to the table they started on, so replacing the
/// cached table never changes a running quiz.
pub struct QuestionCache {
    loader: QuestionLoader,
    ttl: Duration,
    entry: RwLock<Option<CachedStore>>,
}

impl QuestionCache {
    pub fn new(loader: QuestionLoader, ttl: Duration) -> Self {
        Self {
            loader,
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Returns the cached table, loading it if absent or expired.
    pub async fn get(&self) -> Result<Arc<QuestionStore>, LoadError> {
        if let Some(store) = self.fresh(&*self.entry.read().await) {
            return Ok(store);
        }

        let mut entry = self.entry.write().await;
        // Another request may have reloaded while we waited for the lock.
        if let Some(store) = self.fresh(&entry) {
            return Ok(store);
        }

        let store = Arc::new(self.loader.load().await?);
        *entry = Some(CachedStore {
            store: Arc::clone(&store),
            fetched_at: Instant::now(),
        });
        Ok(store)
    }

    /// Drops the cached table and loads it again.
    /// On failure the cache is left empty.
    pub async fn refresh(&self) -> Result<Arc<QuestionStore>, LoadError> {
        let mut entry = self.entry.write().await;
        *entry = None;
        tracing::info!("Question cache cleared, reloading");

        let store = Arc::new(self.loader.load().await?);
        *entry = Some(CachedStore {
            store: Arc::clone(&store),
            fetched_at: Instant::now(),
        });
        Ok(store)
    }

    fn fresh(&self, entry: &Option<CachedStore>) -> Option<Arc<QuestionStore>> {
        entry
            .as_ref()
            .filter(|cached| cached.fetched_at.elapsed() < self.ttl)
            .map(|cached| Arc::clone(&cached.store))
    }
}
