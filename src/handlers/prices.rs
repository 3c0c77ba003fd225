use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::{api_error, item_not_found, store_error, ApiError};
use crate::models::price::{
    BatchCheckResult, PriceCheckResponse, PriceHistoryQuery, PriceRecordResponse, SaleItem,
};
use crate::scrapers::ScrapeError;
use crate::services::price_check;
use crate::AppState;

fn quote_status(error: &ScrapeError) -> StatusCode {
    match error {
        ScrapeError::InvalidSource => StatusCode::BAD_REQUEST,
        ScrapeError::FetchFailed(_) => StatusCode::BAD_GATEWAY,
        ScrapeError::NoPrice => StatusCode::UNPROCESSABLE_ENTITY,
        ScrapeError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/items/{id}/check-price
pub async fn check_item_price(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<PriceCheckResponse>, ApiError> {
    let item = state
        .store
        .get_item(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| item_not_found(id))?;

    let Some(url) = item.price_source() else {
        return Err(api_error(StatusCode::BAD_REQUEST, "No source URL set for this item"));
    };

    let quote = price_check::check_item(state.store.as_ref(), &state.extractor, item.id, url)
        .await
        .map_err(store_error)?;

    if let Some(e) = &quote.error {
        return Err(api_error(quote_status(e), e.to_string()));
    }

    Ok(Json(PriceCheckResponse::from(quote)))
}

/// GET /api/items/{id}/price-history
pub async fn get_price_history(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(query): Query<PriceHistoryQuery>,
) -> Result<Json<Vec<PriceRecordResponse>>, ApiError> {
    state
        .store
        .get_item(id)
        .await
        .map_err(store_error)?
        .ok_or_else(|| item_not_found(id))?;

    let history = state
        .store
        .price_history(id, query.limit())
        .await
        .map_err(store_error)?;

    Ok(Json(history.into_iter().map(PriceRecordResponse::from).collect()))
}

/// GET /api/sales
pub async fn get_sales(State(state): State<AppState>) -> Result<Json<Vec<SaleItem>>, ApiError> {
    let sales = state.store.sale_items().await.map_err(store_error)?;

    Ok(Json(
        sales
            .into_iter()
            .map(|(item, record)| SaleItem {
                item_id: item.id,
                name: item.name,
                source_url: item.source_url,
                price: record.price,
                regular_price: record.regular_price,
                checked_at: record.checked_at,
            })
            .collect(),
    ))
}

/// POST /api/check-all-prices
///
/// Runs inline, so the response takes at least the politeness delay per item.
pub async fn check_all_prices(
    State(state): State<AppState>,
) -> Result<Json<Vec<BatchCheckResult>>, ApiError> {
    let results = price_check::check_all(state.store.as_ref(), &state.extractor)
        .await
        .map_err(store_error)?;
    Ok(Json(results))
}
