use std::sync::Arc;

use tracing::info;

use super::{
    config::{Config, ConfigError, ImageBackend, StoreBackend},
    database::KvStore,
    error::StartupError,
    images::{BlobImageStore, LocalImageStore, SharedImages},
    storage::{CachedStore, FileStore, MemoryStore, SharedStore},
};

pub struct AppState {
    pub config: Config,
    pub store: CachedStore,
    pub images: SharedImages,
}

impl AppState {
    /// Picks the backends named in `config`, once, at startup.
    pub async fn new(config: Config) -> Result<Arc<Self>, StartupError> {
        let store: SharedStore = match config.store_backend {
            StoreBackend::File => Arc::new(FileStore::new(&config.wishes_file)),
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::Kv => {
                Arc::new(KvStore::connect(&config.redis_url, &config.wishes_key).await?)
            }
        };

        let images: SharedImages = match config.image_backend {
            ImageBackend::Local => Arc::new(LocalImageStore::new(&config.uploads_dir)),
            ImageBackend::Blob => {
                let token = config
                    .blob_token
                    .clone()
                    .ok_or(ConfigError::Missing("BLOB_READ_WRITE_TOKEN"))?;

                Arc::new(BlobImageStore::new(&config.blob_url, token))
            }
        };

        info!(
            "Storing wishes in {} backend, images in {:?} backend",
            store.name(),
            config.image_backend
        );

        Ok(Self::from_parts(config, store, images))
    }

    pub fn from_parts(config: Config, store: SharedStore, images: SharedImages) -> Arc<Self> {
        let store = CachedStore::new(store, config.cache_ttl);

        Arc::new(Self {
            config,
            store,
            images,
        })
    }
}
