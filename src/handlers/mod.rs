pub mod items;
pub mod prices;
pub mod purchases;
pub mod stores;

use axum::{http::StatusCode, Json};

use crate::models::ErrorResponse;
use crate::services::store::StoreError;

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn store_error(err: StoreError) -> ApiError {
    match err {
        StoreError::NotFound(what) => api_error(StatusCode::NOT_FOUND, format!("{} not found", what)),
        StoreError::Database(e) => {
            tracing::error!("Database error: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, format!("Database error: {}", e))
        }
    }
}

pub(crate) fn item_not_found(id: i32) -> ApiError {
    api_error(StatusCode::NOT_FOUND, format!("Item {} not found", id))
}

/// GET /
pub async fn index() -> &'static str {
    "Grocery Tracker is running"
}
