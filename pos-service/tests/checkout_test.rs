//! Checkout flow tests against the in-memory gateway.

mod common;

use common::seed_item_on;
use pos_service::models::{CreateDiscount, DiscountType};
use pos_service::services::cart::Cart;
use pos_service::services::checkout::{checkout, CheckoutRequest};
use pos_service::services::{Gateway, MemoryGateway};
use pos_service::models::StoreSettings;
use retail_core::error::AppError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn request(discount_code: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        cashier_id: Uuid::new_v4(),
        cashier_name: Some("Dana".to_string()),
        customer_id: None,
        customer_name: None,
        discount_code: discount_code.map(|c| c.to_string()),
        payment_method: "cash".to_string(),
    }
}

async fn seed_ten_percent_discount(gateway: &MemoryGateway) {
    gateway
        .create_discount(&CreateDiscount {
            code: "SAVE10".to_string(),
            description: None,
            discount_type: DiscountType::Percentage,
            discount_value: dec!(10),
            min_purchase: None,
            max_uses: None,
            is_active: true,
            valid_from: None,
            valid_until: None,
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn checkout_decrements_stock_and_writes_sale_rows() {
    let gateway = MemoryGateway::new();
    let item = seed_item_on(&gateway, "Brake Pad", "BP-1", 5, dec!(10.00)).await;

    let mut cart = Cart::new();
    cart.add_item(item.clone()).unwrap();
    cart.set_quantity(item.id, 3).unwrap();

    let receipt = checkout(&gateway, &cart, &request(None), &StoreSettings::default())
        .await
        .unwrap();

    assert!(receipt.receipt_number.starts_with("RCP-"));
    assert_eq!(receipt.subtotal, dec!(30.00));
    assert_eq!(receipt.total, dec!(30.00));

    let remaining = gateway.get_inventory_item(item.id).await.unwrap().unwrap();
    assert_eq!(remaining.quantity, 2);

    let rows = gateway
        .list_sales_by_receipt(&receipt.receipt_number)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].quantity_sold, 3);
    assert_eq!(rows[0].total_price, dec!(30.00));
}

#[tokio::test]
async fn percentage_discount_is_applied_and_usage_counted() {
    let gateway = MemoryGateway::new();
    seed_ten_percent_discount(&gateway).await;
    let item = seed_item_on(&gateway, "Brake Pad", "BP-1", 5, dec!(10.00)).await;

    let mut cart = Cart::new();
    cart.add_item(item.clone()).unwrap();
    cart.set_quantity(item.id, 3).unwrap();

    let receipt = checkout(
        &gateway,
        &cart,
        &request(Some("save10")),
        &StoreSettings::default(),
    )
    .await
    .unwrap();

    // $30 cart, 10% off
    assert_eq!(receipt.subtotal, dec!(30.00));
    assert_eq!(receipt.discount_amount, dec!(3.00));
    assert_eq!(receipt.total, dec!(27.00));

    let rows = gateway
        .list_sales_by_receipt(&receipt.receipt_number)
        .await
        .unwrap();
    assert_eq!(rows[0].total_price, dec!(27.00));
    assert_eq!(rows[0].discount_amount, Some(dec!(3.00)));

    let discount = gateway.find_discount_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(discount.used_count, 1);
}

#[tokio::test]
async fn discount_is_prorated_across_lines_and_sums_exactly() {
    let gateway = MemoryGateway::new();
    seed_ten_percent_discount(&gateway).await;
    let a = seed_item_on(&gateway, "Filter A", "FA-1", 10, dec!(3.33)).await;
    let b = seed_item_on(&gateway, "Filter B", "FB-1", 10, dec!(6.67)).await;

    let mut cart = Cart::new();
    cart.add_item(a).unwrap();
    cart.add_item(b).unwrap();

    let receipt = checkout(
        &gateway,
        &cart,
        &request(Some("SAVE10")),
        &StoreSettings::default(),
    )
    .await
    .unwrap();

    let rows = gateway
        .list_sales_by_receipt(&receipt.receipt_number)
        .await
        .unwrap();
    let total: Decimal = rows.iter().map(|r| r.total_price).sum();
    assert_eq!(total, receipt.subtotal - receipt.discount_amount);
}

#[tokio::test]
async fn tax_is_a_receipt_projection_not_stored_on_rows() {
    let gateway = MemoryGateway::new();
    let item = seed_item_on(&gateway, "Brake Pad", "BP-1", 5, dec!(10.00)).await;

    let mut cart = Cart::new();
    cart.add_item(item.clone()).unwrap();

    let mut settings = StoreSettings::default();
    settings.tax_rate = dec!(8.5);
    let receipt = checkout(&gateway, &cart, &request(None), &settings)
        .await
        .unwrap();

    assert_eq!(receipt.tax_amount, dec!(0.85));
    assert_eq!(receipt.total, dec!(10.85));

    let rows = gateway
        .list_sales_by_receipt(&receipt.receipt_number)
        .await
        .unwrap();
    // Stored rows stay pre-tax.
    assert_eq!(rows[0].total_price, dec!(10.00));
}

#[tokio::test]
async fn failed_line_rolls_back_committed_lines() {
    let gateway = MemoryGateway::new();
    let good = seed_item_on(&gateway, "Filter", "F-1", 10, dec!(5.00)).await;
    let scarce = seed_item_on(&gateway, "Alternator", "A-1", 2, dec!(50.00)).await;

    let mut cart = Cart::new();
    cart.add_item(good.clone()).unwrap();
    cart.set_quantity(good.id, 4).unwrap();
    cart.add_item(scarce.clone()).unwrap();
    cart.set_quantity(scarce.id, 2).unwrap();

    // Someone else buys the scarce stock between cart and commit.
    gateway
        .decrement_inventory_with_floor(scarce.id, 1)
        .await
        .unwrap();

    let err = checkout(&gateway, &cart, &request(None), &StoreSettings::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InsufficientStock { .. }));

    // First line's decrement was compensated, nothing was sold.
    let good_after = gateway.get_inventory_item(good.id).await.unwrap().unwrap();
    assert_eq!(good_after.quantity, 10);
    let scarce_after = gateway.get_inventory_item(scarce.id).await.unwrap().unwrap();
    assert_eq!(scarce_after.quantity, 1);
}

#[tokio::test]
async fn empty_cart_is_rejected() {
    let gateway = MemoryGateway::new();
    let err = checkout(
        &gateway,
        &Cart::new(),
        &request(None),
        &StoreSettings::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));
}

#[tokio::test]
async fn failed_checkout_leaves_discount_usage_untouched() {
    let gateway = MemoryGateway::new();
    seed_ten_percent_discount(&gateway).await;
    let scarce = seed_item_on(&gateway, "Alternator", "A-1", 1, dec!(50.00)).await;

    let mut cart = Cart::new();
    cart.add_item(scarce.clone()).unwrap();

    gateway
        .decrement_inventory_with_floor(scarce.id, 1)
        .await
        .unwrap();

    checkout(
        &gateway,
        &cart,
        &request(Some("SAVE10")),
        &StoreSettings::default(),
    )
    .await
    .unwrap_err();

    let discount = gateway.find_discount_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(discount.used_count, 0);
}
