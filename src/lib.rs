// src/lib.rs

use std::sync::Arc;

use scrapers::PriceExtractor;
use services::store::GroceryStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn GroceryStore>,
    pub extractor: Arc<PriceExtractor>,
}

pub mod entities {
    pub mod prelude;
    pub mod items;
    pub mod price_history;
    pub mod purchases;
    pub mod stores;
}

pub mod services {
    pub mod catalog;
    pub mod memory_store;
    pub mod prediction;
    pub mod price_check;
    pub mod sea_orm_store;
    pub mod store;
}

pub mod config;
pub mod handlers;
pub mod jobs;
pub mod models;
pub mod routes;
pub mod scrapers;
