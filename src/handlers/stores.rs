use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{api_error, store_error, ApiError};
use crate::entities::stores;
use crate::models::store::CreateStoreRequest;
use crate::models::MessageResponse;
use crate::AppState;

/// GET /api/stores
pub async fn list_stores(State(state): State<AppState>) -> Result<Json<Vec<stores::Model>>, ApiError> {
    let all = state.store.list_stores().await.map_err(store_error)?;
    Ok(Json(all))
}

/// POST /api/stores
pub async fn create_store(
    State(state): State<AppState>,
    Json(payload): Json<CreateStoreRequest>,
) -> Result<(StatusCode, Json<stores::Model>), ApiError> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Store name is required"));
    }

    let store = state
        .store
        .create_store(name.to_string())
        .await
        .map_err(store_error)?;
    Ok((StatusCode::CREATED, Json(store)))
}

/// DELETE /api/stores/{id}
pub async fn delete_store(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.store.delete_store(id).await.map_err(store_error)? {
        return Err(api_error(StatusCode::NOT_FOUND, format!("Store {} not found", id)));
    }

    Ok(Json(MessageResponse {
        message: "Store deleted successfully".to_string(),
    }))
}
