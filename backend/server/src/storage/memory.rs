use std::collections::VecDeque;

use async_trait::async_trait;
use book::Wish;
use tokio::sync::RwLock;

use super::{StorageError, WishStore};

/// Non-durable store. Restarting the process empties the wall.
#[derive(Default)]
pub struct MemoryStore {
    wishes: RwLock<VecDeque<Wish>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `wishes` must already be newest first.
    pub fn with_wishes(wishes: Vec<Wish>) -> Self {
        Self {
            wishes: RwLock::new(wishes.into()),
        }
    }
}

#[async_trait]
impl WishStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read_wishes(&self) -> Result<Vec<Wish>, StorageError> {
        Ok(self.wishes.read().await.iter().cloned().collect())
    }

    async fn add_wish(&self, wish: Wish) -> Result<Wish, StorageError> {
        self.wishes.write().await.push_front(wish.clone());

        Ok(wish)
    }
}
