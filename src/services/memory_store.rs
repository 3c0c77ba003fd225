use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::store::{GroceryStore, ItemChanges, NewItem, NewPurchase, StoreError};
use crate::entities::{items, price_history, purchases, stores};

#[derive(Default)]
struct Tables {
    items: BTreeMap<i32, items::Model>,
    price_history: Vec<price_history::Model>,
    purchases: Vec<purchases::Model>,
    stores: BTreeMap<i32, stores::Model>,
    next_item_id: i32,
    next_price_id: i64,
    next_purchase_id: i32,
    next_store_id: i32,
}

impl Tables {
    fn item(&self, id: i32) -> Result<&items::Model, StoreError> {
        self.items
            .get(&id)
            .ok_or_else(|| StoreError::NotFound(format!("item {}", id)))
    }

    fn ensure_store(&self, id: i32) -> Result<(), StoreError> {
        if self.stores.contains_key(&id) {
            Ok(())
        } else {
            Err(StoreError::NotFound(format!("store {}", id)))
        }
    }

    fn history_newest_first(&self, item_id: i32) -> Vec<price_history::Model> {
        let mut history: Vec<_> = self
            .price_history
            .iter()
            .filter(|r| r.item_id == item_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.checked_at.cmp(&a.checked_at).then(b.id.cmp(&a.id)));
        history
    }
}

/// Process-local store for development and tests. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GroceryStore for InMemoryStore {
    async fn list_items(&self) -> Result<Vec<items::Model>, StoreError> {
        let tables = self.tables.read();
        let mut all: Vec<_> = tables.items.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(all)
    }

    async fn shopping_list(&self) -> Result<Vec<items::Model>, StoreError> {
        let tables = self.tables.read();
        let mut on_list: Vec<_> = tables.items.values().filter(|i| i.on_list).cloned().collect();
        // `None` sorts before any store id
        on_list.sort_by(|a, b| a.store_id.cmp(&b.store_id).then_with(|| a.name.cmp(&b.name)));
        Ok(on_list)
    }

    async fn items_with_urls(&self) -> Result<Vec<items::Model>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .items
            .values()
            .filter(|i| i.source_url.as_deref().is_some_and(|url| !url.is_empty()))
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: i32) -> Result<Option<items::Model>, StoreError> {
        Ok(self.tables.read().items.get(&id).cloned())
    }

    async fn create_item(&self, item: NewItem) -> Result<items::Model, StoreError> {
        let mut tables = self.tables.write();
        if let Some(store_id) = item.store_id {
            tables.ensure_store(store_id)?;
        }

        tables.next_item_id += 1;
        let model = items::Model {
            id: tables.next_item_id,
            name: item.name,
            source_url: item.source_url,
            on_list: item.on_list,
            store_id: item.store_id,
            target_frequency_days: item.target_frequency_days,
            occasional: item.occasional,
            created_at: Utc::now().naive_utc(),
        };
        tables.items.insert(model.id, model.clone());
        Ok(model)
    }

    async fn update_item(&self, id: i32, changes: ItemChanges) -> Result<Option<items::Model>, StoreError> {
        let mut tables = self.tables.write();
        if !tables.items.contains_key(&id) {
            return Ok(None);
        }
        if let Some(Some(store_id)) = changes.store_id {
            tables.ensure_store(store_id)?;
        }

        let Some(item) = tables.items.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(name) = changes.name {
            item.name = name;
        }
        if let Some(source_url) = changes.source_url {
            item.source_url = source_url;
        }
        if let Some(on_list) = changes.on_list {
            item.on_list = on_list;
        }
        if let Some(store_id) = changes.store_id {
            item.store_id = store_id;
        }
        if let Some(occasional) = changes.occasional {
            item.occasional = occasional;
        }
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if tables.items.remove(&id).is_none() {
            return Ok(false);
        }
        tables.price_history.retain(|r| r.item_id != id);
        tables.purchases.retain(|p| p.item_id != id);
        Ok(true)
    }

    async fn set_target_frequency(
        &self,
        id: i32,
        days: Option<i32>,
    ) -> Result<Option<items::Model>, StoreError> {
        let mut tables = self.tables.write();
        Ok(tables.items.get_mut(&id).map(|item| {
            item.target_frequency_days = days;
            item.clone()
        }))
    }

    async fn insert_price_record(
        &self,
        item_id: i32,
        price: Decimal,
        regular_price: Option<Decimal>,
        on_sale: bool,
    ) -> Result<price_history::Model, StoreError> {
        let mut tables = self.tables.write();
        tables.item(item_id)?;

        tables.next_price_id += 1;
        let record = price_history::Model {
            id: tables.next_price_id,
            item_id,
            price,
            regular_price,
            on_sale,
            checked_at: Utc::now().naive_utc(),
        };
        tables.price_history.push(record.clone());
        Ok(record)
    }

    async fn latest_price(&self, item_id: i32) -> Result<Option<price_history::Model>, StoreError> {
        Ok(self.tables.read().history_newest_first(item_id).into_iter().next())
    }

    async fn price_history(&self, item_id: i32, limit: u64) -> Result<Vec<price_history::Model>, StoreError> {
        let mut history = self.tables.read().history_newest_first(item_id);
        history.truncate(limit as usize);
        Ok(history)
    }

    async fn sale_items(&self) -> Result<Vec<(items::Model, price_history::Model)>, StoreError> {
        let tables = self.tables.read();
        Ok(tables
            .items
            .values()
            .filter_map(|item| {
                let latest = tables.history_newest_first(item.id).into_iter().next()?;
                latest.on_sale.then(|| (item.clone(), latest))
            })
            .collect())
    }

    async fn record_purchase(&self, purchase: NewPurchase) -> Result<purchases::Model, StoreError> {
        let mut tables = self.tables.write();
        tables.item(purchase.item_id)?;

        tables.next_purchase_id += 1;
        let record = purchases::Model {
            id: tables.next_purchase_id,
            item_id: purchase.item_id,
            user_id: purchase.user_id,
            price: purchase.price,
            on_sale: purchase.on_sale,
            purchased_at: purchase.purchased_at,
        };
        tables.purchases.push(record.clone());

        if let Some(item) = tables.items.get_mut(&purchase.item_id) {
            item.on_list = false;
        }
        Ok(record)
    }

    async fn purchase_history(&self, item_id: i32) -> Result<Vec<purchases::Model>, StoreError> {
        let tables = self.tables.read();
        let mut history: Vec<_> = tables
            .purchases
            .iter()
            .filter(|p| p.item_id == item_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| a.purchased_at.cmp(&b.purchased_at).then(a.id.cmp(&b.id)));
        Ok(history)
    }

    async fn list_stores(&self) -> Result<Vec<stores::Model>, StoreError> {
        let mut all: Vec<_> = self.tables.read().stores.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn create_store(&self, name: String) -> Result<stores::Model, StoreError> {
        let mut tables = self.tables.write();
        tables.next_store_id += 1;
        let store = stores::Model {
            id: tables.next_store_id,
            name,
            created_at: Utc::now().naive_utc(),
        };
        tables.stores.insert(store.id, store.clone());
        Ok(store)
    }

    async fn delete_store(&self, id: i32) -> Result<bool, StoreError> {
        let mut tables = self.tables.write();
        if tables.stores.remove(&id).is_none() {
            return Ok(false);
        }
        for item in tables.items.values_mut() {
            if item.store_id == Some(id) {
                item.store_id = None;
            }
        }
        Ok(true)
    }
}
