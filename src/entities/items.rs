//! SeaORM Entity for tracked grocery items

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    /// Product page the price checker scrapes
    #[sea_orm(column_type = "Text", nullable)]
    pub source_url: Option<String>,
    /// Whether the item is on the active shopping list
    pub on_list: bool,
    pub store_id: Option<i32>,
    /// Explicit purchase cadence, overrides the computed average
    pub target_frequency_days: Option<i32>,
    /// Bought irregularly; excluded from cadence reminders on the client
    pub occasional: bool,
    pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::stores::Entity",
        from = "Column::StoreId",
        to = "super::stores::Column::Id",
        on_delete = "SetNull"
    )]
    Stores,
    #[sea_orm(has_many = "super::price_history::Entity")]
    PriceHistory,
    #[sea_orm(has_many = "super::purchases::Entity")]
    Purchases,
}

impl Related<super::stores::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Stores.def()
    }
}

impl Related<super::price_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PriceHistory.def()
    }
}

impl Related<super::purchases::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Purchases.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Items without a usable URL are skipped by the price checker
    pub fn price_source(&self) -> Option<&str> {
        self.source_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
