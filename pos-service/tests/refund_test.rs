//! Refund flow tests.

mod common;

use common::seed_item_on;
use pos_service::models::StoreSettings;
use pos_service::services::cart::Cart;
use pos_service::services::checkout::{checkout, CheckoutRequest};
use pos_service::services::refunds::refund_receipt;
use pos_service::services::{Gateway, MemoryGateway};
use retail_core::error::AppError;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn request() -> CheckoutRequest {
    CheckoutRequest {
        cashier_id: Uuid::new_v4(),
        cashier_name: None,
        customer_id: None,
        customer_name: None,
        discount_code: None,
        payment_method: "card".to_string(),
    }
}

#[tokio::test]
async fn refund_restores_stock_and_removes_rows() {
    let gateway = MemoryGateway::new();
    let item = seed_item_on(&gateway, "Brake Pad", "BP-1", 5, dec!(10.00)).await;

    let mut cart = Cart::new();
    cart.add_item(item.clone()).unwrap();
    cart.set_quantity(item.id, 3).unwrap();
    let receipt = checkout(&gateway, &cart, &request(), &StoreSettings::default())
        .await
        .unwrap();
    assert_eq!(
        gateway.get_inventory_item(item.id).await.unwrap().unwrap().quantity,
        2
    );

    let summary = refund_receipt(&gateway, &receipt.receipt_number, Uuid::new_v4())
        .await
        .unwrap();
    assert_eq!(summary.lines_refunded, 1);
    assert_eq!(summary.units_restored, 3);
    assert_eq!(summary.amount_refunded, dec!(30.00));

    assert_eq!(
        gateway.get_inventory_item(item.id).await.unwrap().unwrap().quantity,
        5
    );
    assert!(gateway
        .list_sales_by_receipt(&receipt.receipt_number)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn unknown_receipt_is_not_found() {
    let gateway = MemoryGateway::new();
    let err = refund_receipt(&gateway, "RCP-MISSING", Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn double_refund_fails_the_second_time() {
    let gateway = MemoryGateway::new();
    let item = seed_item_on(&gateway, "Brake Pad", "BP-1", 5, dec!(10.00)).await;

    let mut cart = Cart::new();
    cart.add_item(item).unwrap();
    let receipt = checkout(&gateway, &cart, &request(), &StoreSettings::default())
        .await
        .unwrap();

    refund_receipt(&gateway, &receipt.receipt_number, Uuid::new_v4())
        .await
        .unwrap();
    let err = refund_receipt(&gateway, &receipt.receipt_number, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn refund_does_not_return_discount_uses() {
    let gateway = MemoryGateway::new();
    let item = seed_item_on(&gateway, "Brake Pad", "BP-1", 5, dec!(10.00)).await;
    gateway
        .create_discount(&pos_service::models::CreateDiscount {
            code: "SAVE10".to_string(),
            description: None,
            discount_type: pos_service::models::DiscountType::Percentage,
            discount_value: dec!(10),
            min_purchase: None,
            max_uses: Some(5),
            is_active: true,
            valid_from: None,
            valid_until: None,
        })
        .await
        .unwrap();

    let mut cart = Cart::new();
    cart.add_item(item).unwrap();
    let mut req = request();
    req.discount_code = Some("SAVE10".to_string());
    let receipt = checkout(&gateway, &cart, &req, &StoreSettings::default())
        .await
        .unwrap();

    refund_receipt(&gateway, &receipt.receipt_number, Uuid::new_v4())
        .await
        .unwrap();

    // The use stays spent after the refund.
    let discount = gateway.find_discount_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(discount.used_count, 1);
}
