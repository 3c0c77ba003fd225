use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::purchases;

/// Body for POST /api/items/{id}/purchase
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordPurchaseRequest {
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub on_sale: Option<bool>,
    pub user_id: Option<i32>,
    /// Date or date-time; defaults to now
    pub purchased_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseResponse {
    pub id: i32,
    pub item_id: i32,
    pub user_id: Option<i32>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub on_sale: bool,
    pub purchased_at: NaiveDateTime,
}

impl From<purchases::Model> for PurchaseResponse {
    fn from(record: purchases::Model) -> Self {
        Self {
            id: record.id,
            item_id: record.item_id,
            user_id: record.user_id,
            price: record.price,
            on_sale: record.on_sale,
            purchased_at: record.purchased_at,
        }
    }
}

/// Response for GET /api/items/{id}/purchases
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseHistoryResponse {
    pub item_id: i32,
    pub purchases: Vec<PurchaseResponse>,
    pub target_frequency_days: Option<i32>,
    pub average_interval_days: Option<i64>,
    pub next_purchase: Option<NaiveDate>,
}

/// Body for PUT /api/items/{id}/frequency; `null` clears the override
#[derive(Debug, Clone, Deserialize)]
pub struct FrequencyRequest {
    pub target_frequency_days: Option<i32>,
}
