use std::sync::Arc;

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{StatusCode, header::CACHE_CONTROL},
    response::IntoResponse,
};
use book::{ErrorResponse, Wish, WishResponse, WishesResponse};
use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use crate::{error::AppError, state::AppState, storage::WishStore, utils::get_submission};

pub async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

pub async fn list_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    let wishes = state.store.read_wishes().await?;
    let cache_control = format!("public, max-age={}", state.store.ttl().as_secs());

    Ok(([(CACHE_CONTROL, cache_control)], Json(WishesResponse { wishes })))
}

pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, AppError> {
    let multipart = multipart.map_err(|e| {
        warn!("Rejected submission body: {e}");
        AppError::MalformedPayload
    })?;

    let submission = get_submission(multipart).await?.validate()?;

    let image_url = match &submission.image {
        Some(image) => Some(state.images.put(image).await?),
        None => None,
    };

    let wish = state
        .store
        .add_wish(Wish::new(submission.name, submission.message, image_url))
        .await?;

    info!("Added wish {} from {}", wish.id, wish.name);

    Ok((StatusCode::CREATED, Json(WishResponse { wish })))
}

pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse {
            error: "Method not allowed".to_string(),
        }),
    )
}
