//! # Redis
//!
//! Key-value backend for the wall.
//!
//! Core purpose is to keep wishes somewhere that survives restarts and tolerates
//! several server instances appending at once.
//!
//! ## Requirements
//!
//! - Append at the head must be atomic per call
//! - Whole wall read in one round trip
//! - Small dataset, a few hundred wishes at most for one birthday
//!
//! ## Implementation
//!
//! - Redis list: 1 key per wall, each element is one JSON-encoded wish
//! - `LPUSH` to append, so the head of the list is always the newest wish
//! - `LRANGE 0 -1` to read, already newest first
//! - Redis queues commands, so concurrent appends never clobber each other
use std::time::Duration;

use async_trait::async_trait;
use book::Wish;
use redis::{
    AsyncCommands, Client, RedisError,
    aio::{ConnectionManager, ConnectionManagerConfig},
};
use tracing::info;

use crate::storage::{StorageError, WishStore};

pub async fn init_redis(redis_url: &str) -> Result<ConnectionManager, RedisError> {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(500));

    let client = Client::open(redis_url)?;
    let connection_manager = client.get_connection_manager_with_config(config).await?;

    info!("Connected to Redis at {redis_url}");

    Ok(connection_manager)
}

pub struct KvStore {
    connection: ConnectionManager,
    key: String,
}

impl KvStore {
    pub fn new(connection: ConnectionManager, key: impl Into<String>) -> Self {
        Self {
            connection,
            key: key.into(),
        }
    }

    pub async fn connect(redis_url: &str, key: impl Into<String>) -> Result<Self, StorageError> {
        Ok(Self::new(init_redis(redis_url).await?, key))
    }
}

#[async_trait]
impl WishStore for KvStore {
    fn name(&self) -> &'static str {
        "kv"
    }

    async fn read_wishes(&self) -> Result<Vec<Wish>, StorageError> {
        let mut connection = self.connection.clone();
        let raw: Vec<String> = connection.lrange(&self.key, 0, -1).await?;

        raw.iter()
            .map(|entry| serde_json::from_str(entry).map_err(StorageError::from))
            .collect()
    }

    async fn add_wish(&self, wish: Wish) -> Result<Wish, StorageError> {
        let encoded = serde_json::to_string(&wish)?;

        let mut connection = self.connection.clone();
        let _: i64 = connection.lpush(&self.key, encoded).await?;

        Ok(wish)
    }
}
