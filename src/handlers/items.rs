use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;

use super::{api_error, item_not_found, store_error, ApiError};
use crate::models::item::{CreateItemRequest, CreateItemResponse, ItemSummary, UpdateItemRequest};
use crate::models::purchase::FrequencyRequest;
use crate::models::MessageResponse;
use crate::services::store::{ItemChanges, NewItem, NewPurchase};
use crate::services::{catalog, price_check};
use crate::AppState;

fn clean_url(url: Option<String>) -> Option<String> {
    url.map(|u| u.trim().to_string()).filter(|u| !u.is_empty())
}

fn validate_frequency(days: Option<i32>) -> Result<Option<i32>, ApiError> {
    match days {
        Some(d) if d <= 0 => Err(api_error(
            StatusCode::BAD_REQUEST,
            "target_frequency_days must be a positive number of days",
        )),
        other => Ok(other),
    }
}

/// GET /api/items
pub async fn list_items(State(state): State<AppState>) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    let items = state.store.list_items().await.map_err(store_error)?;
    let summaries = catalog::item_summaries(state.store.as_ref(), items)
        .await
        .map_err(store_error)?;
    Ok(Json(summaries))
}

/// GET /api/shopping-list
pub async fn shopping_list(State(state): State<AppState>) -> Result<Json<Vec<ItemSummary>>, ApiError> {
    let items = state.store.shopping_list().await.map_err(store_error)?;
    let summaries = catalog::item_summaries(state.store.as_ref(), items)
        .await
        .map_err(store_error)?;
    Ok(Json(summaries))
}

/// GET /api/items/{id}
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ItemSummary>, ApiError> {
    let item = state
        .store
        .get_item(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| item_not_found(id))?;

    let summary = catalog::item_summary(state.store.as_ref(), item)
        .await
        .map_err(store_error)?;
    Ok(Json(summary))
}

/// POST /api/items
///
/// Items created with a source URL get an immediate price check.
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<CreateItemResponse>), ApiError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "Item name is required"));
    }
    let target_frequency_days = validate_frequency(payload.target_frequency_days)?;
    let source_url = clean_url(payload.source_url);

    let item = state
        .store
        .create_item(NewItem {
            name,
            source_url: source_url.clone(),
            on_list: payload.on_list.unwrap_or(true),
            store_id: payload.store_id,
            target_frequency_days,
            occasional: payload.occasional,
        })
        .await
        .map_err(store_error)?;

    tracing::info!("Added item {} ({})", item.id, item.name);

    if let Some(url) = source_url {
        let quote = price_check::check_item(state.store.as_ref(), &state.extractor, item.id, &url)
            .await
            .map_err(store_error)?;
        if let Some(e) = quote.error {
            tracing::warn!("Initial price check for item {} failed: {}", item.id, e);
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(CreateItemResponse {
            id: item.id,
            message: "Item added successfully".to_string(),
        }),
    ))
}

/// PUT /api/items/{id}
///
/// `purchased: true` records a purchase now, which also takes the item off
/// the list; `purchased: false` puts it back unless `on_list` says otherwise.
pub async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<ItemSummary>, ApiError> {
    let name = match payload.name {
        Some(name) if name.trim().is_empty() => {
            return Err(api_error(StatusCode::BAD_REQUEST, "Item name cannot be empty"));
        }
        other => other.map(|n| n.trim().to_string()),
    };

    let on_list = match (payload.on_list, payload.purchased) {
        (Some(on_list), _) => Some(on_list),
        (None, Some(false)) => Some(true),
        (None, _) => None,
    };

    let changes = ItemChanges {
        name,
        source_url: payload.source_url.map(clean_url),
        on_list,
        store_id: payload.store_id,
        occasional: payload.occasional,
    };

    let mut item = state
        .store
        .update_item(id, changes)
        .await
        .map_err(store_error)?
        .ok_or_else(|| item_not_found(id))?;

    if payload.purchased == Some(true) {
        state
            .store
            .record_purchase(NewPurchase {
                item_id: id,
                user_id: None,
                price: None,
                on_sale: false,
                purchased_at: Utc::now().naive_utc(),
            })
            .await
            .map_err(store_error)?;
        tracing::info!("Item {} marked as purchased", id);

        item = state
            .store
            .get_item(id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| item_not_found(id))?;
    }

    let summary = catalog::item_summary(state.store.as_ref(), item)
        .await
        .map_err(store_error)?;
    Ok(Json(summary))
}

/// DELETE /api/items/{id}
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.store.delete_item(id).await.map_err(store_error)?;
    if !deleted {
        return Err(item_not_found(id));
    }

    tracing::info!("Deleted item {}", id);
    Ok(Json(MessageResponse {
        message: "Item deleted successfully".to_string(),
    }))
}

/// PUT /api/items/{id}/frequency
pub async fn set_frequency(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<FrequencyRequest>,
) -> Result<Json<ItemSummary>, ApiError> {
    let days = validate_frequency(payload.target_frequency_days)?;

    let item = state
        .store
        .set_target_frequency(id, days)
        .await
        .map_err(store_error)?
        .ok_or_else(|| item_not_found(id))?;

    let summary = catalog::item_summary(state.store.as_ref(), item)
        .await
        .map_err(store_error)?;
    Ok(Json(summary))
}
