//! Reporting tests.

mod common;

use chrono::{Duration, Utc};
use common::seed_item_on;
use pos_service::models::StoreSettings;
use pos_service::services::cart::Cart;
use pos_service::services::checkout::{checkout, CheckoutRequest};
use pos_service::services::reports;
use pos_service::services::MemoryGateway;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn request() -> CheckoutRequest {
    CheckoutRequest {
        cashier_id: Uuid::new_v4(),
        cashier_name: None,
        customer_id: None,
        customer_name: None,
        discount_code: None,
        payment_method: "cash".to_string(),
    }
}

#[tokio::test]
async fn daily_sales_totals_checkouts_by_receipt() {
    let gateway = MemoryGateway::new();
    let a = seed_item_on(&gateway, "Brake Pad", "BP-1", 10, dec!(10.00)).await;
    let b = seed_item_on(&gateway, "Oil Filter", "OF-1", 10, dec!(5.00)).await;

    // Two checkouts today: one with two lines, one with one.
    let mut cart = Cart::new();
    cart.add_item(a.clone()).unwrap();
    cart.add_item(b.clone()).unwrap();
    checkout(&gateway, &cart, &request(), &StoreSettings::default())
        .await
        .unwrap();

    let mut cart = Cart::new();
    cart.add_item(a).unwrap();
    checkout(&gateway, &cart, &request(), &StoreSettings::default())
        .await
        .unwrap();

    let now = Utc::now();
    let days = reports::daily_sales(&gateway, now - Duration::days(1), now + Duration::days(1))
        .await
        .unwrap();

    assert_eq!(days.len(), 1);
    assert_eq!(days[0].total, dec!(25.00));
    // Three rows, two receipts.
    assert_eq!(days[0].transactions, 2);
}

#[tokio::test]
async fn sales_outside_the_range_are_excluded() {
    let gateway = MemoryGateway::new();
    let item = seed_item_on(&gateway, "Brake Pad", "BP-1", 10, dec!(10.00)).await;

    let mut cart = Cart::new();
    cart.add_item(item).unwrap();
    checkout(&gateway, &cart, &request(), &StoreSettings::default())
        .await
        .unwrap();

    let now = Utc::now();
    let days = reports::daily_sales(&gateway, now - Duration::days(30), now - Duration::days(29))
        .await
        .unwrap();
    assert!(days.is_empty());
}

#[tokio::test]
async fn inventory_summary_counts_units_value_and_low_stock() {
    let gateway = MemoryGateway::new();
    // reorder_level is 2 in the seed helper; quantity 1 is low stock.
    seed_item_on(&gateway, "Brake Pad", "BP-1", 10, dec!(10.00)).await;
    seed_item_on(&gateway, "Oil Filter", "OF-1", 1, dec!(6.00)).await;

    let summary = reports::inventory_summary(&gateway).await.unwrap();
    assert_eq!(summary.total_items, 2);
    assert_eq!(summary.total_units, 11);
    // Cost price is half the selling price in the seed helper.
    assert_eq!(summary.stock_value, dec!(53.00));
    assert_eq!(summary.low_stock_items, 1);
}
