//! # Book
//!
//! Wire types shared between the server and anything talking to it.
//!
//! All payloads are JSON with camelCase keys:
//! - `GET /api/wishes` answers [`WishesResponse`]
//! - `POST /api/wishes` answers [`WishResponse`] on success
//! - every failure answers [`ErrorResponse`]
//!
//! Older walls stored a bare `imageFileName` instead of `imageUrl`. Those records
//! still load, with the file name resolved under [`UPLOADS_ROUTE`].
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Where locally stored pictures are served from.
pub const UPLOADS_ROUTE: &str = "/uploads";

/// A single entry on the wall. Written once, never edited.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "StoredWish")]
pub struct Wish {
    pub id: String,
    pub name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub image_url: Option<String>,
}

/// Every shape a wish has been written in.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredWish {
    id: String,
    name: String,
    message: String,
    created_at: DateTime<Utc>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    image_file_name: Option<String>,
}

impl From<StoredWish> for Wish {
    fn from(stored: StoredWish) -> Self {
        let image_url = stored.image_url.or_else(|| {
            stored
                .image_file_name
                .filter(|file| !file.is_empty())
                .map(|file| format!("{UPLOADS_ROUTE}/{file}"))
        });

        Self {
            id: stored.id,
            name: stored.name,
            message: stored.message,
            created_at: stored.created_at,
            image_url,
        }
    }
}

impl Wish {
    /// Fresh wish stamped with a new id and the current time.
    pub fn new(
        name: impl Into<String>,
        message: impl Into<String>,
        image_url: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            message: message.into(),
            created_at: Utc::now(),
            image_url,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WishesResponse {
    pub wishes: Vec<Wish>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WishResponse {
    pub wish: Wish,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}
