//! # Submissions
//!
//! Everything a visitor sends is checked here before anything is written.
//!
//! - name: trimmed, 1 to 60 characters
//! - message: trimmed, 1 to 500 characters
//! - image: optional, JPEG/PNG/WEBP only, at most 2 MiB
//!
//! Lengths count `char`s, not bytes, so Thai or emoji names get the same budget as
//! ASCII ones.
use axum::body::Bytes;

use crate::{
    error::AppError,
    images::{Image, ImageKind},
};

pub const MAX_NAME_CHARS: usize = 60;
pub const MAX_MESSAGE_CHARS: usize = 500;
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

pub const NAME_ERROR: &str = "Please enter a name of at most 60 characters";
pub const MESSAGE_ERROR: &str = "Please write a message between 1 and 500 characters";
pub const IMAGE_TYPE_ERROR: &str = "Only JPG, PNG or WEBP images are supported";
pub const IMAGE_SIZE_ERROR: &str = "Images must not exceed 2MB";

/// Image part as it came off the wire.
#[derive(Debug, Clone, Default)]
pub struct RawImage {
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Default)]
pub struct Submission {
    pub name: String,
    pub message: String,
    pub image: Option<RawImage>,
}

/// A submission that passed every check. Only these reach storage.
#[derive(Debug, Clone)]
pub struct ValidSubmission {
    pub name: String,
    pub message: String,
    pub image: Option<Image>,
}

impl Submission {
    pub fn validate(self) -> Result<ValidSubmission, AppError> {
        let name =
            bounded(&self.name, MAX_NAME_CHARS).ok_or_else(|| AppError::invalid(NAME_ERROR))?;
        let message = bounded(&self.message, MAX_MESSAGE_CHARS)
            .ok_or_else(|| AppError::invalid(MESSAGE_ERROR))?;

        let image = self.image.map(validate_image).transpose()?;

        Ok(ValidSubmission {
            name,
            message,
            image,
        })
    }
}

fn bounded(input: &str, max_chars: usize) -> Option<String> {
    let trimmed = input.trim();
    let chars = trimmed.chars().count();

    (chars > 0 && chars <= max_chars).then(|| trimmed.to_string())
}

fn validate_image(raw: RawImage) -> Result<Image, AppError> {
    let kind = raw
        .content_type
        .as_deref()
        .and_then(ImageKind::from_mime)
        .ok_or_else(|| AppError::invalid(IMAGE_TYPE_ERROR))?;

    if raw.bytes.len() > MAX_IMAGE_BYTES {
        return Err(AppError::invalid(IMAGE_SIZE_ERROR));
    }

    Ok(Image {
        kind,
        bytes: raw.bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, message: &str) -> Submission {
        Submission {
            name: name.to_string(),
            message: message.to_string(),
            image: None,
        }
    }

    fn image(content_type: &str, len: usize) -> Option<RawImage> {
        Some(RawImage {
            content_type: Some(content_type.to_string()),
            bytes: Bytes::from(vec![0u8; len]),
        })
    }

    fn rejection(result: Result<ValidSubmission, AppError>) -> String {
        match result {
            Err(AppError::InvalidInput(message)) => message,
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_trims() {
        let valid = submission("  Ann  ", "\n Happy birthday! \t").validate().unwrap();

        assert_eq!(valid.name, "Ann");
        assert_eq!(valid.message, "Happy birthday!");
        assert!(valid.image.is_none());
    }

    #[test]
    fn test_name_bounds() {
        assert!(submission(&"a".repeat(60), "hi").validate().is_ok());
        assert_eq!(rejection(submission(&"a".repeat(61), "hi").validate()), NAME_ERROR);
        assert_eq!(rejection(submission("", "hi").validate()), NAME_ERROR);
        assert_eq!(rejection(submission("    ", "hi").validate()), NAME_ERROR);
    }

    #[test]
    fn test_message_bounds() {
        assert!(submission("Ann", &"m".repeat(500)).validate().is_ok());
        assert_eq!(rejection(submission("Ann", &"m".repeat(501)).validate()), MESSAGE_ERROR);
        assert_eq!(rejection(submission("Ann", " \n ").validate()), MESSAGE_ERROR);
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        let thai = "สุขสันต์วันเกิด".repeat(4);
        assert!(thai.len() > 60);
        assert!(thai.chars().count() <= 60);

        assert!(submission(&thai, "hi").validate().is_ok());
    }

    #[test]
    fn test_padding_ignored_in_length() {
        let padded = format!("   {}   ", "a".repeat(60));

        assert_eq!(submission(&padded, "hi").validate().unwrap().name.len(), 60);
    }

    #[test]
    fn test_image_types() {
        for mime in ["image/jpeg", "image/png", "image/webp"] {
            let mut sub = submission("Ann", "hi");
            sub.image = image(mime, 16);
            assert!(sub.validate().unwrap().image.is_some(), "{mime} should pass");
        }

        let mut gif = submission("Ann", "hi");
        gif.image = image("image/gif", 16);
        assert_eq!(rejection(gif.validate()), IMAGE_TYPE_ERROR);

        let mut untyped = submission("Ann", "hi");
        untyped.image = Some(RawImage {
            content_type: None,
            bytes: Bytes::from_static(b"data"),
        });
        assert_eq!(rejection(untyped.validate()), IMAGE_TYPE_ERROR);
    }

    #[test]
    fn test_image_size() {
        let mut exact = submission("Ann", "hi");
        exact.image = image("image/png", MAX_IMAGE_BYTES);
        assert!(exact.validate().is_ok());

        let mut over = submission("Ann", "hi");
        over.image = image("image/png", MAX_IMAGE_BYTES + 1);
        assert_eq!(rejection(over.validate()), IMAGE_SIZE_ERROR);
    }

    #[test]
    fn test_name_checked_first() {
        let mut sub = submission("", "");
        sub.image = image("image/gif", 16);

        assert_eq!(rejection(sub.validate()), NAME_ERROR);
    }
}
