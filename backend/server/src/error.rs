use std::io;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use book::ErrorResponse;
use thiserror::Error;
use tracing::error;

use crate::{config::ConfigError, images::UploadError, storage::StorageError};

pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Malformed payload")]
    MalformedPayload,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StorageError),

    #[error("Image upload failed: {0}")]
    UploadFailed(#[from] UploadError),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            AppError::MalformedPayload => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::StorageUnavailable(_) | AppError::UploadFailed(_) => {
                error!("{self}");
                (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

/// Anything that stops the server from coming up.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let invalid = AppError::invalid("Name too long").into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

        let malformed = AppError::MalformedPayload.into_response();
        assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);

        let storage =
            AppError::from(StorageError::Io(io::Error::other("disk gone"))).into_response();
        assert_eq!(storage.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let upload = AppError::from(UploadError::Io(io::Error::other("disk gone"))).into_response();
        assert_eq!(upload.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
