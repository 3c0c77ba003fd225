use std::sync::Arc;

use grocery_tracker::{
    config::{AppConfig, StorageBackend},
    jobs::price_check_sync::start_price_check_job,
    routes,
    scrapers::{HttpFetcher, PriceExtractor},
    services::{memory_store::InMemoryStore, sea_orm_store::SeaOrmStore, store::GroceryStore},
    AppState,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,grocery_tracker=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().expect("Invalid configuration");

    let store: Arc<dyn GroceryStore> = match &config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
        StorageBackend::Sql(url) => {
            tracing::info!("Connecting to database...");
            let store = SeaOrmStore::connect(url)
                .await
                .expect("Failed to connect to database");
            Arc::new(store)
        }
    };

    let fetcher = HttpFetcher::new(&config.scraper).expect("Failed to build HTTP client");
    let extractor = PriceExtractor::new(Arc::new(fetcher), &config.scraper);

    let state = AppState {
        store,
        extractor: Arc::new(extractor),
    };

    if config.price_check_enabled {
        start_price_check_job(state.clone(), config.price_check_hour).await;
        tracing::info!(
            "Daily price checks scheduled for {:02}:00",
            config.price_check_hour
        );
    }

    let app = routes::router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");

    tracing::info!(
        "Server listening on {}",
        listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| config.bind_addr.clone())
    );

    axum::serve(listener, app).await.expect("Server error");
}
