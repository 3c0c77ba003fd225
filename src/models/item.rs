use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::double_option;

/// Body for POST /api/items
#[derive(Debug, Clone, Deserialize)]
pub struct CreateItemRequest {
    #[serde(default)]
    pub name: String,
    pub source_url: Option<String>,
    pub store_id: Option<i32>,
    pub target_frequency_days: Option<i32>,
    #[serde(default)]
    pub occasional: bool,
    pub on_list: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateItemResponse {
    pub id: i32,
    pub message: String,
}

/// Body for PUT /api/items/{id}. Absent fields are left alone; `null` clears.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateItemRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub source_url: Option<Option<String>>,
    pub on_list: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub store_id: Option<Option<i32>>,
    pub occasional: Option<bool>,
    /// `true` records a purchase now
    pub purchased: Option<bool>,
}

/// Item with its current price and purchase cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemSummary {
    pub id: i32,
    pub name: String,
    pub source_url: Option<String>,
    pub on_list: bool,
    pub store_id: Option<i32>,
    pub target_frequency_days: Option<i32>,
    pub occasional: bool,
    pub created_at: NaiveDateTime,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub current_price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub regular_price: Option<Decimal>,
    pub on_sale: bool,
    pub last_checked: Option<NaiveDateTime>,
    pub purchase_count: usize,
    pub last_purchased: Option<NaiveDateTime>,
    pub average_interval_days: Option<i64>,
    pub next_purchase: Option<NaiveDate>,
}
