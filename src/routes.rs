use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{self, items, prices, purchases, stores};
use crate::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/items", get(items::list_items).post(items::create_item))
        .route(
            "/api/items/{id}",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .route("/api/items/{id}/check-price", post(prices::check_item_price))
        .route("/api/items/{id}/price-history", get(prices::get_price_history))
        .route("/api/items/{id}/purchase", post(purchases::record_purchase))
        .route("/api/items/{id}/purchases", get(purchases::get_purchases))
        .route("/api/items/{id}/frequency", put(items::set_frequency))
        .route("/api/shopping-list", get(items::shopping_list))
        .route("/api/sales", get(prices::get_sales))
        .route("/api/check-all-prices", post(prices::check_all_prices))
        .route("/api/stores", get(stores::list_stores).post(stores::create_store))
        .route("/api/stores/{id}", axum::routing::delete(stores::delete_store))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
