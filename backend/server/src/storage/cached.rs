use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use async_trait::async_trait;
use book::Wish;
use tokio::sync::RwLock;

use super::{SharedStore, StorageError, WishStore};

struct Snapshot {
    taken_at: Instant,
    wishes: Arc<Vec<Wish>>,
}

/// Read-through snapshot over another store.
///
/// The snapshot is filled on the first read after it expires and dropped right
/// after every successful append, so a writer always sees its own wish on the
/// next read. A zero `ttl` turns caching off.
///
/// `generation` moves on every invalidation. A read only publishes its result if
/// no invalidation happened while it was fetching from the inner store.
pub struct CachedStore {
    inner: SharedStore,
    ttl: Duration,
    snapshot: RwLock<Option<Snapshot>>,
    generation: AtomicU64,
}

impl CachedStore {
    pub fn new(inner: SharedStore, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn invalidate(&self) {
        let mut snapshot = self.snapshot.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *snapshot = None;
    }

    async fn fresh(&self) -> Option<Arc<Vec<Wish>>> {
        self.snapshot
            .read()
            .await
            .as_ref()
            .filter(|snapshot| snapshot.taken_at.elapsed() < self.ttl)
            .map(|snapshot| snapshot.wishes.clone())
    }
}

#[async_trait]
impl WishStore for CachedStore {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn read_wishes(&self) -> Result<Vec<Wish>, StorageError> {
        if let Some(wishes) = self.fresh().await {
            return Ok(wishes.as_ref().clone());
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let wishes = self.inner.read_wishes().await?;

        if !self.ttl.is_zero() {
            let mut snapshot = self.snapshot.write().await;

            // a write landed mid-read, this list may already be stale
            if self.generation.load(Ordering::SeqCst) == generation {
                *snapshot = Some(Snapshot {
                    taken_at: Instant::now(),
                    wishes: Arc::new(wishes.clone()),
                });
            }
        }

        Ok(wishes)
    }

    async fn add_wish(&self, wish: Wish) -> Result<Wish, StorageError> {
        let wish = self.inner.add_wish(wish).await?;
        self.invalidate().await;

        Ok(wish)
    }
}
