mod common;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use grocery_tracker::services::store::{GroceryStore, ItemChanges, NewItem, NewPurchase};
use rust_decimal_macros::dec;

use crate::common::{setup_sqlite_store, BANANAS_URL, MILK_URL};

fn item(name: &str, url: Option<&str>, store_id: Option<i32>) -> NewItem {
    NewItem {
        name: name.to_string(),
        source_url: url.map(str::to_string),
        on_list: true,
        store_id,
        target_frequency_days: None,
        occasional: false,
    }
}

fn day(d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, d)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn purchase(item_id: i32, at: NaiveDateTime) -> NewPurchase {
    NewPurchase {
        item_id,
        user_id: None,
        price: Some(dec!(3.99)),
        on_sale: false,
        purchased_at: at,
    }
}

#[tokio::test]
async fn test_items_crud_round_trip() {
    let store = setup_sqlite_store().await;

    let created = store.create_item(item("Bananas", Some(BANANAS_URL), None)).await.unwrap();
    assert!(created.on_list);

    let fetched = store.get_item(created.id).await.unwrap().unwrap();
    assert_eq!(fetched.name, "Bananas");
    assert_eq!(fetched.price_source(), Some(BANANAS_URL));

    let updated = store
        .update_item(
            created.id,
            ItemChanges {
                name: Some("Organic Bananas".to_string()),
                source_url: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name, "Organic Bananas");
    assert!(updated.source_url.is_none());

    assert!(store.update_item(999, ItemChanges::default()).await.unwrap().is_none());
    assert!(store.get_item(999).await.unwrap().is_none());
}

#[tokio::test]
async fn test_items_with_urls_skips_blank_sources() {
    let store = setup_sqlite_store().await;

    let bananas = store.create_item(item("Bananas", Some(BANANAS_URL), None)).await.unwrap();
    store.create_item(item("Napkins", None, None)).await.unwrap();
    let milk = store.create_item(item("Milk", Some(MILK_URL), None)).await.unwrap();

    let ids: Vec<i32> = store
        .items_with_urls()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.id)
        .collect();
    assert_eq!(ids, vec![bananas.id, milk.id]);
}

#[tokio::test]
async fn test_price_history_newest_first() {
    let store = setup_sqlite_store().await;
    let bananas = store.create_item(item("Bananas", Some(BANANAS_URL), None)).await.unwrap();

    store.insert_price_record(bananas.id, dec!(0.29), Some(dec!(0.29)), false).await.unwrap();
    store.insert_price_record(bananas.id, dec!(0.25), Some(dec!(0.29)), true).await.unwrap();

    let latest = store.latest_price(bananas.id).await.unwrap().unwrap();
    assert_eq!(latest.price.round_dp(2), dec!(0.25));
    assert!(latest.on_sale);

    let history = store.price_history(bananas.id, 30).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].price.round_dp(2), dec!(0.29));

    assert_eq!(store.price_history(bananas.id, 1).await.unwrap().len(), 1);

    let sales = store.sale_items().await.unwrap();
    assert_eq!(sales.len(), 1);
    assert_eq!(sales[0].0.id, bananas.id);
}

#[tokio::test]
async fn test_sale_items_use_latest_record_only() {
    let store = setup_sqlite_store().await;
    let milk = store.create_item(item("Milk", Some(MILK_URL), None)).await.unwrap();

    store.insert_price_record(milk.id, dec!(4.49), Some(dec!(5.29)), true).await.unwrap();
    store.insert_price_record(milk.id, dec!(5.29), Some(dec!(5.29)), false).await.unwrap();

    assert!(store.sale_items().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_purchase_takes_item_off_list() {
    let store = setup_sqlite_store().await;
    let coffee = store.create_item(item("Coffee", None, None)).await.unwrap();
    let tea = store.create_item(item("Tea", None, None)).await.unwrap();

    store.record_purchase(purchase(coffee.id, day(12))).await.unwrap();
    store.record_purchase(purchase(coffee.id, day(1))).await.unwrap();

    let coffee = store.get_item(coffee.id).await.unwrap().unwrap();
    assert!(!coffee.on_list);

    let list: Vec<i32> = store.shopping_list().await.unwrap().iter().map(|i| i.id).collect();
    assert_eq!(list, vec![tea.id]);

    // Oldest first regardless of insertion order
    let timestamps = store.purchase_timestamps(coffee.id).await.unwrap();
    assert_eq!(timestamps, vec![day(1), day(12)]);
    assert_eq!(timestamps[1] - timestamps[0], Duration::days(11));

    let err = store.record_purchase(purchase(999, day(1))).await.unwrap_err();
    assert_eq!(err.to_string(), "item 999 not found");
}

#[tokio::test]
async fn test_shopping_list_puts_unassigned_items_first() {
    let store = setup_sqlite_store().await;
    let co_op = store.create_store("Co-op".to_string()).await.unwrap();

    store.create_item(item("Yogurt", None, Some(co_op.id))).await.unwrap();
    store.create_item(item("Bread", None, Some(co_op.id))).await.unwrap();
    store.create_item(item("Apples", None, None)).await.unwrap();

    let names: Vec<String> = store
        .shopping_list()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.name)
        .collect();
    assert_eq!(names, vec!["Apples", "Bread", "Yogurt"]);
}

#[tokio::test]
async fn test_delete_item_removes_history_and_purchases() {
    let store = setup_sqlite_store().await;
    let milk = store.create_item(item("Milk", Some(MILK_URL), None)).await.unwrap();
    store.insert_price_record(milk.id, dec!(4.49), None, false).await.unwrap();
    store.record_purchase(purchase(milk.id, day(3))).await.unwrap();

    assert!(store.delete_item(milk.id).await.unwrap());
    assert!(!store.delete_item(milk.id).await.unwrap());

    assert!(store.latest_price(milk.id).await.unwrap().is_none());
    assert!(store.purchase_history(milk.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stores_and_detach_on_delete() {
    let store = setup_sqlite_store().await;
    let wfm = store.create_store("Whole Foods".to_string()).await.unwrap();
    let co_op = store.create_store("Co-op".to_string()).await.unwrap();

    let names: Vec<String> = store.list_stores().await.unwrap().into_iter().map(|s| s.name).collect();
    assert_eq!(names, vec!["Co-op", "Whole Foods"]);

    let bananas = store.create_item(item("Bananas", None, Some(wfm.id))).await.unwrap();
    assert_eq!(bananas.store_id, Some(wfm.id));

    assert!(store.create_item(item("Ghost", None, Some(404))).await.is_err());

    assert!(store.delete_store(wfm.id).await.unwrap());
    let bananas = store.get_item(bananas.id).await.unwrap().unwrap();
    assert!(bananas.store_id.is_none());

    assert!(!store.delete_store(wfm.id).await.unwrap());
    assert_eq!(store.list_stores().await.unwrap()[0].id, co_op.id);
}

#[tokio::test]
async fn test_frequency_override_round_trip() {
    let store = setup_sqlite_store().await;
    let coffee = store.create_item(item("Coffee", None, None)).await.unwrap();

    let set = store.set_target_frequency(coffee.id, Some(14)).await.unwrap().unwrap();
    assert_eq!(set.target_frequency_days, Some(14));

    let cleared = store.set_target_frequency(coffee.id, None).await.unwrap().unwrap();
    assert!(cleared.target_frequency_days.is_none());

    assert!(store.set_target_frequency(999, Some(7)).await.unwrap().is_none());
}
