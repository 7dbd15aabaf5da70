//! # Images
//!
//! Where uploaded pictures end up.
//!
//! - [`LocalImageStore`]: files in a directory, served back by the app under `/uploads/`
//! - [`BlobImageStore`]: remote object storage over HTTP, answers with a public URL
//!
//! Either way the wish only records the URL returned by [`ImageStore::put`].
use std::{io, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::Utc;
use reqwest::{
    Client, StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::Deserialize;
use thiserror::Error;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

pub use book::UPLOADS_ROUTE;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Blob store rejected upload with {0}")]
    Rejected(StatusCode),
}

/// Accepted image formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Webp,
}

impl ImageKind {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }
}

/// An image that already passed type and size checks.
#[derive(Debug, Clone)]
pub struct Image {
    pub kind: ImageKind,
    pub bytes: Bytes,
}

impl Image {
    /// `<unix-millis>-<uuid>.<ext>`, unique per call.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            Uuid::new_v4().simple(),
            self.kind.extension()
        )
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persists the image and returns the URL clients should fetch it from.
    async fn put(&self, image: &Image) -> Result<String, UploadError>;
}

pub type SharedImages = Arc<dyn ImageStore>;

pub struct LocalImageStore {
    dir: PathBuf,
}

impl LocalImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn put(&self, image: &Image) -> Result<String, UploadError> {
        fs::create_dir_all(&self.dir).await?;

        let file_name = image.file_name();
        fs::write(self.dir.join(&file_name), &image.bytes).await?;

        Ok(format!("{UPLOADS_ROUTE}/{file_name}"))
    }
}

#[derive(Deserialize)]
struct BlobResponse {
    url: String,
}

/// `PUT {base_url}/wishes/<file>` with a bearer token, public read access.
pub struct BlobImageStore {
    client: Client,
    base_url: String,
    token: String,
}

impl BlobImageStore {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }
}

#[async_trait]
impl ImageStore for BlobImageStore {
    async fn put(&self, image: &Image) -> Result<String, UploadError> {
        let endpoint = format!("{}/wishes/{}", self.base_url, image.file_name());

        let response = self
            .client
            .put(&endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(CONTENT_TYPE, image.kind.mime())
            .header("x-content-type", image.kind.mime())
            .header("x-add-random-suffix", "0")
            .body(image.bytes.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(UploadError::Rejected(response.status()));
        }

        let BlobResponse { url } = response.json().await?;
        info!("Uploaded image to {url}");

        Ok(url)
    }
}
