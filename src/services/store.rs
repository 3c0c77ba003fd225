//! Persistence port for items, price history, purchases and stores.
//!
//! Two implementations exist: [`SeaOrmStore`](super::sea_orm_store::SeaOrmStore)
//! for SQLite / Postgres and [`InMemoryStore`](super::memory_store::InMemoryStore).
//! `main` picks one from `DATABASE_URL`.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::DbErr;

use crate::entities::{items, price_history, purchases, stores};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] DbErr),
    #[error("{0} not found")]
    NotFound(String),
}

#[derive(Debug, Clone)]
pub struct NewItem {
    pub name: String,
    pub source_url: Option<String>,
    pub on_list: bool,
    pub store_id: Option<i32>,
    pub target_frequency_days: Option<i32>,
    pub occasional: bool,
}

/// Partial update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the URL
    pub source_url: Option<Option<String>>,
    pub on_list: Option<bool>,
    /// `Some(None)` detaches the item from its store
    pub store_id: Option<Option<i32>>,
    pub occasional: Option<bool>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.source_url.is_none()
            && self.on_list.is_none()
            && self.store_id.is_none()
            && self.occasional.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewPurchase {
    pub item_id: i32,
    pub user_id: Option<i32>,
    pub price: Option<Decimal>,
    pub on_sale: bool,
    pub purchased_at: NaiveDateTime,
}

#[async_trait]
pub trait GroceryStore: Send + Sync {
    /// All items, newest first
    async fn list_items(&self) -> Result<Vec<items::Model>, StoreError>;
    async fn shopping_list(&self) -> Result<Vec<items::Model>, StoreError>;
    /// Items the price checker should visit
    async fn items_with_urls(&self) -> Result<Vec<items::Model>, StoreError>;
    async fn get_item(&self, id: i32) -> Result<Option<items::Model>, StoreError>;
    async fn create_item(&self, item: NewItem) -> Result<items::Model, StoreError>;
    async fn update_item(&self, id: i32, changes: ItemChanges) -> Result<Option<items::Model>, StoreError>;
    /// Deletes the item with its price history and purchases
    async fn delete_item(&self, id: i32) -> Result<bool, StoreError>;
    async fn set_target_frequency(
        &self,
        id: i32,
        days: Option<i32>,
    ) -> Result<Option<items::Model>, StoreError>;

    async fn insert_price_record(
        &self,
        item_id: i32,
        price: Decimal,
        regular_price: Option<Decimal>,
        on_sale: bool,
    ) -> Result<price_history::Model, StoreError>;
    async fn latest_price(&self, item_id: i32) -> Result<Option<price_history::Model>, StoreError>;
    /// Newest first
    async fn price_history(&self, item_id: i32, limit: u64) -> Result<Vec<price_history::Model>, StoreError>;
    /// Items whose latest price record is on sale
    async fn sale_items(&self) -> Result<Vec<(items::Model, price_history::Model)>, StoreError>;

    /// Appends a purchase and takes the item off the shopping list
    async fn record_purchase(&self, purchase: NewPurchase) -> Result<purchases::Model, StoreError>;
    /// Oldest first
    async fn purchase_history(&self, item_id: i32) -> Result<Vec<purchases::Model>, StoreError>;

    async fn purchase_timestamps(&self, item_id: i32) -> Result<Vec<NaiveDateTime>, StoreError> {
        Ok(self
            .purchase_history(item_id)
            .await?
            .into_iter()
            .map(|p| p.purchased_at)
            .collect())
    }

    async fn list_stores(&self) -> Result<Vec<stores::Model>, StoreError>;
    async fn create_store(&self, name: String) -> Result<stores::Model, StoreError>;
    /// Items of a deleted store keep existing without a store
    async fn delete_store(&self, id: i32) -> Result<bool, StoreError>;
}
