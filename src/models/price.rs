use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::price_history;
use crate::scrapers::PriceQuote;

/// Query parameters for GET /api/items/{id}/price-history
#[derive(Debug, Clone, Deserialize)]
pub struct PriceHistoryQuery {
    pub limit: Option<u64>,
}

impl PriceHistoryQuery {
    pub const DEFAULT_LIMIT: u64 = 30;
    pub const MAX_LIMIT: u64 = 365;

    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceRecordResponse {
    pub id: i64,
    pub item_id: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub regular_price: Option<Decimal>,
    pub on_sale: bool,
    pub checked_at: NaiveDateTime,
}

impl From<price_history::Model> for PriceRecordResponse {
    fn from(record: price_history::Model) -> Self {
        Self {
            id: record.id,
            item_id: record.item_id,
            price: record.price,
            regular_price: record.regular_price,
            on_sale: record.on_sale,
            checked_at: record.checked_at,
        }
    }
}

/// Response for POST /api/items/{id}/check-price
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceCheckResponse {
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub regular_price: Option<Decimal>,
    pub on_sale: bool,
    pub product_name: Option<String>,
}

impl From<PriceQuote> for PriceCheckResponse {
    fn from(quote: PriceQuote) -> Self {
        Self {
            price: quote.price,
            regular_price: quote.regular_price,
            on_sale: quote.on_sale,
            product_name: quote.product_name,
        }
    }
}

/// One row of POST /api/check-all-prices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchCheckResult {
    pub item_id: i32,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub regular_price: Option<Decimal>,
    pub on_sale: bool,
    pub error: Option<String>,
}

/// Row of GET /api/sales
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub item_id: i32,
    pub name: String,
    pub source_url: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::float_option")]
    pub regular_price: Option<Decimal>,
    pub checked_at: NaiveDateTime,
}
