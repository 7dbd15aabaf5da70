//! # Storage
//!
//! Append-only persistence for wishes.
//!
//! Every backend honours the same contract:
//! - [`WishStore::read_wishes`] returns everything, newest first, or an empty list
//! - [`WishStore::add_wish`] puts the wish at the head and hands it back
//! - nothing is ever updated or deleted
//!
//! ## Backends
//! - [`FileStore`]: one JSON array on disk, rewritten on every append
//! - [`MemoryStore`]: process lifetime only, gone on restart
//! - [`KvStore`](crate::database::KvStore): Redis list, atomic `LPUSH` per append
//!
//! [`CachedStore`] wraps any of them with a short-lived read snapshot.
use std::{io, sync::Arc};

use async_trait::async_trait;
use book::Wish;
use thiserror::Error;

pub mod cached;
pub mod file;
pub mod memory;

pub use cached::CachedStore;
pub use file::FileStore;
pub use memory::MemoryStore;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

#[async_trait]
pub trait WishStore: Send + Sync {
    fn name(&self) -> &'static str;

    async fn read_wishes(&self) -> Result<Vec<Wish>, StorageError>;

    async fn add_wish(&self, wish: Wish) -> Result<Wish, StorageError>;
}

pub type SharedStore = Arc<dyn WishStore>;
