use crate::models::SearchResponse;
use crate::startup::AppState;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::{Method, StatusCode},
    Json,
};
use service_core::error::AppError;

/// `/api/search` for every method; anything but POST is answered with 405.
pub async fn search(
    State(state): State<AppState>,
    method: Method,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<SearchResponse>, AppError> {
    let body = body.map_err(body_rejection);
    state.relay.handle(&method, body).await.map(Json)
}

fn body_rejection(rejection: BytesRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::BadRequest(rejection.body_text())
    }
}
