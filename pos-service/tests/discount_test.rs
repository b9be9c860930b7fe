//! Discount resolution tests.

use chrono::{Duration, Utc};
use pos_service::models::{CreateDiscount, DiscountType, UpdateDiscount};
use pos_service::services::{discounts, Gateway, MemoryGateway};
use retail_core::error::{AppError, DiscountRejection};
use rust_decimal_macros::dec;

fn base_discount(code: &str) -> CreateDiscount {
    CreateDiscount {
        code: code.to_string(),
        description: None,
        discount_type: DiscountType::Percentage,
        discount_value: dec!(10),
        min_purchase: None,
        max_uses: None,
        is_active: true,
        valid_from: None,
        valid_until: None,
    }
}

#[tokio::test]
async fn codes_match_case_insensitively() {
    let gateway = MemoryGateway::new();
    gateway.create_discount(&base_discount("Save10")).await.unwrap();

    let (discount, amount) = discounts::resolve(&gateway, "sAvE10", dec!(50.00))
        .await
        .unwrap();
    assert_eq!(discount.code, "SAVE10");
    assert_eq!(amount, dec!(5.00));
}

#[tokio::test]
async fn unknown_code_is_not_found() {
    let gateway = MemoryGateway::new();
    let err = discounts::resolve(&gateway, "NOPE", dec!(10.00))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::DiscountInvalid(DiscountRejection::NotFound)
    ));
}

#[tokio::test]
async fn inactive_code_reads_as_not_found() {
    let gateway = MemoryGateway::new();
    let mut input = base_discount("SAVE10");
    input.is_active = false;
    gateway.create_discount(&input).await.unwrap();

    let err = discounts::resolve(&gateway, "SAVE10", dec!(10.00))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::DiscountInvalid(DiscountRejection::NotFound)
    ));
}

#[tokio::test]
async fn expired_code_is_rejected() {
    let gateway = MemoryGateway::new();
    let mut input = base_discount("OLD");
    input.valid_until = Some(Utc::now() - Duration::days(1));
    gateway.create_discount(&input).await.unwrap();

    let err = discounts::resolve(&gateway, "OLD", dec!(10.00))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::DiscountInvalid(DiscountRejection::Expired)
    ));
}

#[tokio::test]
async fn exhausted_code_is_rejected() {
    let gateway = MemoryGateway::new();
    let mut input = base_discount("LIMITED");
    input.max_uses = Some(2);
    let created = gateway.create_discount(&input).await.unwrap();
    gateway
        .update_discount(
            created.id,
            &UpdateDiscount {
                used_count: Some(2),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = discounts::resolve(&gateway, "LIMITED", dec!(10.00))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::DiscountInvalid(DiscountRejection::UsageExceeded)
    ));
}

#[tokio::test]
async fn minimum_purchase_is_enforced() {
    let gateway = MemoryGateway::new();
    let mut input = base_discount("BIGSPEND");
    input.min_purchase = Some(dec!(50.00));
    gateway.create_discount(&input).await.unwrap();

    let err = discounts::resolve(&gateway, "BIGSPEND", dec!(20.00))
        .await
        .unwrap_err();
    match err {
        AppError::DiscountInvalid(DiscountRejection::MinimumNotMet {
            subtotal,
            min_purchase,
        }) => {
            assert_eq!(subtotal, dec!(20.00));
            assert_eq!(min_purchase, dec!(50.00));
        }
        other => panic!("unexpected error: {:?}", other),
    }

    let (_, amount) = discounts::resolve(&gateway, "BIGSPEND", dec!(50.00))
        .await
        .unwrap();
    assert_eq!(amount, dec!(5.00));
}

#[tokio::test]
async fn fixed_discount_never_exceeds_subtotal() {
    let gateway = MemoryGateway::new();
    let mut input = base_discount("FLAT20");
    input.discount_type = DiscountType::Fixed;
    input.discount_value = dec!(20.00);
    gateway.create_discount(&input).await.unwrap();

    let (_, amount) = discounts::resolve(&gateway, "FLAT20", dec!(12.00))
        .await
        .unwrap();
    assert_eq!(amount, dec!(12.00));
}

#[tokio::test]
async fn resolve_does_not_consume_a_use() {
    let gateway = MemoryGateway::new();
    gateway.create_discount(&base_discount("SAVE10")).await.unwrap();

    discounts::resolve(&gateway, "SAVE10", dec!(10.00))
        .await
        .unwrap();
    let discount = gateway.find_discount_by_code("SAVE10").await.unwrap().unwrap();
    assert_eq!(discount.used_count, 0);
}
