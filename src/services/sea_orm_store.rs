use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, NullOrdering},
    ActiveModelTrait, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;

use super::store::{GroceryStore, ItemChanges, NewItem, NewPurchase, StoreError};
use crate::entities::{items, price_history, prelude::*, purchases, stores};

/// SQL-backed store. The driver (SQLite or Postgres) follows the URL scheme.
#[derive(Clone)]
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(database_url.to_string());
        options.sqlx_logging(false);

        // Every pooled connection would get its own empty in-memory database
        if database_url.contains(":memory:") {
            options.max_connections(1).min_connections(1);
        }

        let db = Database::connect(options).await?;

        tracing::info!("Running migrations...");
        migration::Migrator::up(&db, None).await?;

        Ok(Self::new(db))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn find_item<C: ConnectionTrait>(conn: &C, id: i32) -> Result<items::Model, StoreError> {
        Items::find_by_id(id)
            .one(conn)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("item {}", id)))
    }

    async fn ensure_store(&self, id: i32) -> Result<(), StoreError> {
        Stores::find_by_id(id)
            .one(&self.db)
            .await?
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(format!("store {}", id)))
    }
}

#[async_trait]
impl GroceryStore for SeaOrmStore {
    async fn list_items(&self) -> Result<Vec<items::Model>, StoreError> {
        Ok(Items::find()
            .order_by(items::Column::CreatedAt, Order::Desc)
            .order_by(items::Column::Id, Order::Desc)
            .all(&self.db)
            .await?)
    }

    async fn shopping_list(&self) -> Result<Vec<items::Model>, StoreError> {
        Ok(Items::find()
            .filter(items::Column::OnList.eq(true))
            // Unassigned items first on every backend, as in the in-memory store
            .order_by_with_nulls(items::Column::StoreId, Order::Asc, NullOrdering::First)
            .order_by(items::Column::Name, Order::Asc)
            .all(&self.db)
            .await?)
    }

    async fn items_with_urls(&self) -> Result<Vec<items::Model>, StoreError> {
        Ok(Items::find()
            .filter(items::Column::SourceUrl.is_not_null())
            .filter(items::Column::SourceUrl.ne(""))
            .order_by(items::Column::Id, Order::Asc)
            .all(&self.db)
            .await?)
    }

    async fn get_item(&self, id: i32) -> Result<Option<items::Model>, StoreError> {
        Ok(Items::find_by_id(id).one(&self.db).await?)
    }

    async fn create_item(&self, item: NewItem) -> Result<items::Model, StoreError> {
        if let Some(store_id) = item.store_id {
            self.ensure_store(store_id).await?;
        }

        let new_item = items::ActiveModel {
            name: Set(item.name),
            source_url: Set(item.source_url),
            on_list: Set(item.on_list),
            store_id: Set(item.store_id),
            target_frequency_days: Set(item.target_frequency_days),
            occasional: Set(item.occasional),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Ok(new_item.insert(&self.db).await?)
    }

    async fn update_item(&self, id: i32, changes: ItemChanges) -> Result<Option<items::Model>, StoreError> {
        let Some(existing) = Items::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        if let Some(Some(store_id)) = changes.store_id {
            self.ensure_store(store_id).await?;
        }

        if changes.is_empty() {
            return Ok(Some(existing));
        }

        let mut active: items::ActiveModel = existing.into();
        if let Some(name) = changes.name {
            active.name = Set(name);
        }
        if let Some(source_url) = changes.source_url {
            active.source_url = Set(source_url);
        }
        if let Some(on_list) = changes.on_list {
            active.on_list = Set(on_list);
        }
        if let Some(store_id) = changes.store_id {
            active.store_id = Set(store_id);
        }
        if let Some(occasional) = changes.occasional {
            active.occasional = Set(occasional);
        }

        Ok(Some(active.update(&self.db).await?))
    }

    async fn delete_item(&self, id: i32) -> Result<bool, StoreError> {
        let txn = self.db.begin().await?;

        // Explicit child deletes; SQLite only cascades with foreign_keys enabled
        PriceHistory::delete_many()
            .filter(price_history::Column::ItemId.eq(id))
            .exec(&txn)
            .await?;
        Purchases::delete_many()
            .filter(purchases::Column::ItemId.eq(id))
            .exec(&txn)
            .await?;
        let result = Items::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }

    async fn set_target_frequency(
        &self,
        id: i32,
        days: Option<i32>,
    ) -> Result<Option<items::Model>, StoreError> {
        let Some(existing) = Items::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let mut active: items::ActiveModel = existing.into();
        active.target_frequency_days = Set(days);
        Ok(Some(active.update(&self.db).await?))
    }

    async fn insert_price_record(
        &self,
        item_id: i32,
        price: Decimal,
        regular_price: Option<Decimal>,
        on_sale: bool,
    ) -> Result<price_history::Model, StoreError> {
        Self::find_item(&self.db, item_id).await?;

        let record = price_history::ActiveModel {
            item_id: Set(item_id),
            price: Set(price),
            regular_price: Set(regular_price),
            on_sale: Set(on_sale),
            checked_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Ok(record.insert(&self.db).await?)
    }

    async fn latest_price(&self, item_id: i32) -> Result<Option<price_history::Model>, StoreError> {
        Ok(PriceHistory::find()
            .filter(price_history::Column::ItemId.eq(item_id))
            .order_by(price_history::Column::CheckedAt, Order::Desc)
            .order_by(price_history::Column::Id, Order::Desc)
            .one(&self.db)
            .await?)
    }

    async fn price_history(&self, item_id: i32, limit: u64) -> Result<Vec<price_history::Model>, StoreError> {
        Ok(PriceHistory::find()
            .filter(price_history::Column::ItemId.eq(item_id))
            .order_by(price_history::Column::CheckedAt, Order::Desc)
            .order_by(price_history::Column::Id, Order::Desc)
            .limit(limit)
            .all(&self.db)
            .await?)
    }

    async fn sale_items(&self) -> Result<Vec<(items::Model, price_history::Model)>, StoreError> {
        let all_items = Items::find()
            .order_by(items::Column::Id, Order::Asc)
            .all(&self.db)
            .await?;

        let mut on_sale = Vec::new();
        for item in all_items {
            if let Some(latest) = self.latest_price(item.id).await? {
                if latest.on_sale {
                    on_sale.push((item, latest));
                }
            }
        }

        Ok(on_sale)
    }

    async fn record_purchase(&self, purchase: NewPurchase) -> Result<purchases::Model, StoreError> {
        let txn = self.db.begin().await?;

        let item = Self::find_item(&txn, purchase.item_id).await?;

        let record = purchases::ActiveModel {
            item_id: Set(purchase.item_id),
            user_id: Set(purchase.user_id),
            price: Set(purchase.price),
            on_sale: Set(purchase.on_sale),
            purchased_at: Set(purchase.purchased_at),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut active: items::ActiveModel = item.into();
        active.on_list = Set(false);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(record)
    }

    async fn purchase_history(&self, item_id: i32) -> Result<Vec<purchases::Model>, StoreError> {
        Ok(Purchases::find()
            .filter(purchases::Column::ItemId.eq(item_id))
            .order_by(purchases::Column::PurchasedAt, Order::Asc)
            .order_by(purchases::Column::Id, Order::Asc)
            .all(&self.db)
            .await?)
    }

    async fn list_stores(&self) -> Result<Vec<stores::Model>, StoreError> {
        Ok(Stores::find()
            .order_by(stores::Column::Name, Order::Asc)
            .all(&self.db)
            .await?)
    }

    async fn create_store(&self, name: String) -> Result<stores::Model, StoreError> {
        let store = stores::ActiveModel {
            name: Set(name),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        };

        Ok(store.insert(&self.db).await?)
    }

    async fn delete_store(&self, id: i32) -> Result<bool, StoreError> {
        let txn = self.db.begin().await?;

        Items::update_many()
            .col_expr(items::Column::StoreId, Expr::value(Option::<i32>::None))
            .filter(items::Column::StoreId.eq(id))
            .exec(&txn)
            .await?;
        let result = Stores::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(result.rows_affected > 0)
    }
}
