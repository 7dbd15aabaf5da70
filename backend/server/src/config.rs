use std::{
    env,
    fmt::{Debug, Display},
    fs::read_to_string,
    path::PathBuf,
    str::FromStr,
    time::Duration,
};

use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid {key} value: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("{0} is required by the selected backend")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Memory,
    Kv,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" => Ok(Self::Memory),
            "kv" | "redis" => Ok(Self::Kv),
            other => Err(format!("unknown wish backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageBackend {
    Local,
    Blob,
}

impl FromStr for ImageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "blob" => Ok(Self::Blob),
            other => Err(format!("unknown image backend '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub store_backend: StoreBackend,
    pub wishes_file: PathBuf,
    pub redis_url: String,
    pub wishes_key: String,
    pub cache_ttl: Duration,
    pub image_backend: ImageBackend,
    pub uploads_dir: PathBuf,
    pub blob_url: String,
    pub blob_token: Option<String>,
    pub allowed_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 4000,
            store_backend: StoreBackend::File,
            wishes_file: PathBuf::from("data/wishes.json"),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            wishes_key: "birthday-wishes".to_string(),
            cache_ttl: Duration::from_secs(30),
            image_backend: ImageBackend::Local,
            uploads_dir: PathBuf::from("uploads"),
            blob_url: "https://blob.vercel-storage.com".to_string(),
            blob_token: None,
            allowed_origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:4173".to_string(),
            ],
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Every unset key falls back to [`Config::default`].
    fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            port: try_load(&lookup, "RUST_PORT", defaults.port)?,
            store_backend: try_load(&lookup, "WISHES_BACKEND", defaults.store_backend)?,
            wishes_file: try_load(&lookup, "WISHES_FILE", defaults.wishes_file)?,
            redis_url: try_load(&lookup, "REDIS_URL", defaults.redis_url)?,
            wishes_key: try_load(&lookup, "WISHES_KEY", defaults.wishes_key)?,
            cache_ttl: Duration::from_secs(try_load(
                &lookup,
                "WISHES_CACHE_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            image_backend: try_load(&lookup, "IMAGE_BACKEND", defaults.image_backend)?,
            uploads_dir: try_load(&lookup, "UPLOADS_DIR", defaults.uploads_dir)?,
            blob_url: try_load(&lookup, "BLOB_URL", defaults.blob_url)?,
            blob_token: read_secret(&lookup, "BLOB_READ_WRITE_TOKEN").or(defaults.blob_token),
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.allowed_origins),
        };

        if config.image_backend == ImageBackend::Blob && config.blob_token.is_none() {
            return Err(ConfigError::Missing("BLOB_READ_WRITE_TOKEN"));
        }

        Ok(config)
    }
}

fn try_load<T>(
    lookup: impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr + Debug,
    T::Err: Display,
{
    let Some(raw) = lookup(key) else {
        info!("{key} not set, using default: {default:?}");
        return Ok(default);
    };

    raw.parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }
    })
}

/// Environment first, then the docker secret mount.
fn read_secret(lookup: impl Fn(&str) -> Option<String>, secret_name: &str) -> Option<String> {
    if let Some(value) = lookup(secret_name).filter(|v| !v.trim().is_empty()) {
        return Some(value.trim().to_string());
    }

    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path)
        .map(|s| s.trim().to_string())
        .map_err(|e| {
            info!("{secret_name} not available from {path}: {e}");
        })
        .ok()
        .filter(|s| !s.is_empty())
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
