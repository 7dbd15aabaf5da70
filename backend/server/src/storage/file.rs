//! # File Store
//!
//! Whole wall kept as a single pretty-printed JSON array.
//!
//! Every append reads the array, pushes to the front and writes it back through a
//! sibling temp file that is renamed over the live one, so readers never see a
//! half-written array. Appends inside this process queue on a mutex. Separate
//! processes sharing the file can still race and drop a wish; use the Redis
//! backend when that matters.
use std::{io::ErrorKind, path::PathBuf};

use async_trait::async_trait;
use book::Wish;
use tokio::{fs, sync::Mutex};
use tracing::debug;

use super::{StorageError, WishStore};

pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<Wish>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, wishes: &[Wish]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");

        fs::write(&tmp, serde_json::to_vec_pretty(wishes)?).await?;
        fs::rename(&tmp, &self.path).await?;

        Ok(())
    }
}

#[async_trait]
impl WishStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn read_wishes(&self) -> Result<Vec<Wish>, StorageError> {
        self.load().await
    }

    async fn add_wish(&self, wish: Wish) -> Result<Wish, StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut wishes = self.load().await?;
        wishes.insert(0, wish.clone());
        self.save(&wishes).await?;

        debug!("Wrote {} wishes to {}", wishes.len(), self.path.display());

        Ok(wish)
    }
}
