//! Price checks with persistence: run the extractor and append price history.

use crate::entities::{items, price_history};
use crate::models::price::BatchCheckResult;
use crate::scrapers::{PriceExtractor, PriceQuote};
use crate::services::store::{GroceryStore, StoreError};

/// Append a history record when the quote carries a price.
pub async fn record_quote(
    store: &dyn GroceryStore,
    item_id: i32,
    quote: &PriceQuote,
) -> Result<Option<price_history::Model>, StoreError> {
    let Some(price) = quote.price else {
        return Ok(None);
    };

    let record = store
        .insert_price_record(item_id, price, quote.regular_price, quote.on_sale)
        .await?;
    Ok(Some(record))
}

pub async fn check_item(
    store: &dyn GroceryStore,
    extractor: &PriceExtractor,
    item_id: i32,
    url: &str,
) -> Result<PriceQuote, StoreError> {
    let quote = extractor.extract(url).await;
    record_quote(store, item_id, &quote).await?;
    Ok(quote)
}

/// Check every item with a source URL, sequentially, and record what was found.
///
/// A failed save marks that item's row and the batch moves on; only the
/// initial item listing can fail the whole call.
pub async fn check_all(
    store: &dyn GroceryStore,
    extractor: &PriceExtractor,
) -> Result<Vec<BatchCheckResult>, StoreError> {
    let items: Vec<items::Model> = store.items_with_urls().await?;
    tracing::info!("Running price check for {} items", items.len());

    let quotes = extractor.extract_all(&items).await;

    let mut results = Vec::with_capacity(quotes.len());
    let mut recorded = 0;
    for item in items {
        let Some(quote) = quotes.get(&item.id) else {
            continue;
        };

        let mut error = quote.error.as_ref().map(|e| e.to_string());
        match record_quote(store, item.id, quote).await {
            Ok(Some(_)) => recorded += 1,
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to save price for item {} ({}): {}", item.id, item.name, e);
                error = Some(format!("save failed: {}", e));
            }
        }

        results.push(BatchCheckResult {
            item_id: item.id,
            name: item.name,
            price: quote.price,
            regular_price: quote.regular_price,
            on_sale: quote.on_sale,
            error,
        });
    }

    tracing::info!(
        "Price check complete: {} of {} items priced",
        recorded,
        results.len()
    );
    Ok(results)
}
