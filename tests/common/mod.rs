#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use grocery_tracker::{
    routes,
    scrapers::{FetchError, PageFetcher, PriceExtractor, ScraperConfig},
    services::{memory_store::InMemoryStore, sea_orm_store::SeaOrmStore, store::GroceryStore},
    AppState,
};

pub const BANANAS_URL: &str = "https://www.wholefoodsmarket.com/product/organic-bananas";
pub const MILK_URL: &str =
    "https://www.amazon.com/Whole-Foods-Market-Organic-Milk/dp/B07FZ1?almBrandId=wholefoods";
pub const BROKEN_URL: &str = "https://www.wholefoodsmarket.com/product/discontinued";

pub const BANANAS_PAGE: &str = r#"
    <html><body>
      <h1>Organic Bananas</h1>
      <div data-testid="product-price">$0.29/lb</div>
    </body></html>"#;

pub const MILK_PAGE: &str = r#"
    <html><body>
      <span id="productTitle">Organic Whole Milk, 64 fl oz</span>
      <div id="corePrice_feature_div">
        <span class="a-price"><span class="a-offscreen">$4.49</span></span>
        <span class="a-price a-text-price"><span class="a-offscreen">$5.29</span></span>
      </div>
    </body></html>"#;

/// Serves canned pages by URL and counts every request.
/// Unknown URLs fail like a dead host.
#[derive(Default)]
pub struct FakeFetcher {
    pages: HashMap<String, String>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn with_pages(pages: &[(&str, &str)]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.to_string()))
                .collect(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn grocery_pages() -> Arc<Self> {
        Self::with_pages(&[(BANANAS_URL, BANANAS_PAGE), (MILK_URL, MILK_PAGE)])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Transport("connection refused".to_string()))
    }
}

pub fn test_scraper_config() -> ScraperConfig {
    ScraperConfig {
        politeness_delay: Duration::ZERO,
        ..Default::default()
    }
}

pub fn build_state(store: Arc<dyn GroceryStore>, fetcher: Arc<dyn PageFetcher>) -> AppState {
    AppState {
        store,
        extractor: Arc::new(PriceExtractor::new(fetcher, &test_scraper_config())),
    }
}

/// Router over an empty in-memory store
pub fn build_test_router(fetcher: Arc<FakeFetcher>) -> (Router, AppState) {
    let state = build_state(Arc::new(InMemoryStore::new()), fetcher);
    (routes::router(state.clone()), state)
}

/// Fresh SQLite database in memory with migrations applied
pub async fn setup_sqlite_store() -> SeaOrmStore {
    SeaOrmStore::connect("sqlite::memory:")
        .await
        .expect("Failed to set up SQLite store")
}
