//! Read-side assembly: items joined with their current price and purchase cadence.

use crate::entities::items;
use crate::models::item::ItemSummary;
use crate::models::purchase::{PurchaseHistoryResponse, PurchaseResponse};
use crate::services::prediction::{average_interval_days, predict_next_purchase};
use crate::services::store::{GroceryStore, StoreError};

pub async fn item_summary(
    store: &dyn GroceryStore,
    item: items::Model,
) -> Result<ItemSummary, StoreError> {
    let latest = store.latest_price(item.id).await?;
    let timestamps = store.purchase_timestamps(item.id).await?;
    let last_purchased = timestamps.last().copied();

    Ok(ItemSummary {
        current_price: latest.as_ref().map(|r| r.price),
        regular_price: latest.as_ref().and_then(|r| r.regular_price),
        on_sale: latest.as_ref().is_some_and(|r| r.on_sale),
        last_checked: latest.as_ref().map(|r| r.checked_at),
        purchase_count: timestamps.len(),
        last_purchased,
        average_interval_days: average_interval_days(&timestamps),
        next_purchase: predict_next_purchase(item.target_frequency_days, last_purchased, &timestamps),
        id: item.id,
        name: item.name,
        source_url: item.source_url,
        on_list: item.on_list,
        store_id: item.store_id,
        target_frequency_days: item.target_frequency_days,
        occasional: item.occasional,
        created_at: item.created_at,
    })
}

pub async fn item_summaries(
    store: &dyn GroceryStore,
    items: Vec<items::Model>,
) -> Result<Vec<ItemSummary>, StoreError> {
    let mut summaries = Vec::with_capacity(items.len());
    for item in items {
        summaries.push(item_summary(store, item).await?);
    }
    Ok(summaries)
}

pub async fn purchase_overview(
    store: &dyn GroceryStore,
    item: &items::Model,
) -> Result<PurchaseHistoryResponse, StoreError> {
    let history = store.purchase_history(item.id).await?;
    let timestamps: Vec<_> = history.iter().map(|p| p.purchased_at).collect();

    Ok(PurchaseHistoryResponse {
        item_id: item.id,
        target_frequency_days: item.target_frequency_days,
        average_interval_days: average_interval_days(&timestamps),
        next_purchase: predict_next_purchase(
            item.target_frequency_days,
            timestamps.last().copied(),
            &timestamps,
        ),
        purchases: history.into_iter().map(PurchaseResponse::from).collect(),
    })
}
