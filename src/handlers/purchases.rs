use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;

use super::{api_error, item_not_found, store_error, ApiError};
use crate::models::purchase::{PurchaseHistoryResponse, PurchaseResponse, RecordPurchaseRequest};
use crate::services::catalog;
use crate::services::prediction::parse_timestamp;
use crate::services::store::NewPurchase;
use crate::AppState;

/// POST /api/items/{id}/purchase
pub async fn record_purchase(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RecordPurchaseRequest>,
) -> Result<(StatusCode, Json<PurchaseResponse>), ApiError> {
    let purchased_at = match payload.purchased_at.as_deref() {
        None => Utc::now().naive_utc(),
        Some(raw) => parse_timestamp(raw).ok_or_else(|| {
            api_error(
                StatusCode::BAD_REQUEST,
                format!("Invalid purchased_at: '{}'", raw),
            )
        })?,
    };

    if payload.price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(api_error(StatusCode::BAD_REQUEST, "price cannot be negative"));
    }

    let record = state
        .store
        .record_purchase(NewPurchase {
            item_id: id,
            user_id: payload.user_id,
            price: payload.price,
            on_sale: payload.on_sale.unwrap_or(false),
            purchased_at,
        })
        .await
        .map_err(store_error)?;

    tracing::info!("Recorded purchase {} for item {}", record.id, id);
    Ok((StatusCode::CREATED, Json(PurchaseResponse::from(record))))
}

/// GET /api/items/{id}/purchases
pub async fn get_purchases(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PurchaseHistoryResponse>, ApiError> {
    let item = state
        .store
        .get_item(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| item_not_found(id))?;

    let overview = catalog::purchase_overview(state.store.as_ref(), &item)
        .await
        .map_err(store_error)?;
    Ok(Json(overview))
}
