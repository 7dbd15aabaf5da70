use axum::{
    body::Bytes,
    extract::{
        Multipart,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
};
use tracing::warn;

use crate::{
    error::AppError::{self, MalformedPayload},
    submission::{IMAGE_SIZE_ERROR, MAX_IMAGE_BYTES, RawImage, Submission},
};

pub const NAME_FIELD: &str = "name";
pub const MESSAGE_FIELD: &str = "message";
pub const IMAGE_FIELD: &str = "image";

/// Pulls the known fields out of a multipart body. Unknown fields are skipped and
/// only the first image part is kept.
pub async fn get_submission(mut multipart: Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);

        match name.as_deref() {
            Some(NAME_FIELD) => {
                submission.name = field.text().await.map_err(multipart_error)?;
            }
            Some(MESSAGE_FIELD) => {
                submission.message = field.text().await.map_err(multipart_error)?;
            }
            Some(IMAGE_FIELD) if submission.image.is_none() => {
                submission.image = get_image(field).await?;
            }
            _ => {}
        }
    }

    Ok(submission)
}

async fn get_image(mut field: Field<'_>) -> Result<Option<RawImage>, AppError> {
    let content_type = field.content_type().map(str::to_string);
    let has_file_name = field.file_name().is_some_and(|name| !name.is_empty());

    let mut bytes = Vec::new();
    let mut size = 0;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len();

        // keep one byte past the limit so validation can see the overflow,
        // drain the rest so later fields are still reachable
        if bytes.len() <= MAX_IMAGE_BYTES {
            let room = MAX_IMAGE_BYTES + 1 - bytes.len();
            bytes.extend_from_slice(&chunk[..chunk.len().min(room)]);
        }
    }

    // an untouched file input still posts an empty part
    if size == 0 && !has_file_name {
        return Ok(None);
    }

    Ok(Some(RawImage {
        content_type,
        bytes: Bytes::from(bytes),
    }))
}

fn multipart_error(e: MultipartError) -> AppError {
    warn!("Rejected multipart body: {}", e.body_text());

    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::invalid(IMAGE_SIZE_ERROR);
    }

    MalformedPayload
}
