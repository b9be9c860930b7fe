//! Discount code handlers.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{CreateDiscount, Discount, UpdateDiscount};
use crate::services::discounts;
use crate::startup::AppState;
use retail_core::error::AppError;

/// GET /discounts
pub async fn list_discounts(
    State(state): State<AppState>,
) -> Result<Json<Vec<Discount>>, AppError> {
    Ok(Json(state.gateway.list_discounts().await?))
}

/// GET /discounts/:id
pub async fn get_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Discount>, AppError> {
    let discount = state
        .gateway
        .get_discount(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Discount not found")))?;
    Ok(Json(discount))
}

/// POST /discounts
pub async fn create_discount(
    State(state): State<AppState>,
    Json(input): Json<CreateDiscount>,
) -> Result<(StatusCode, Json<Discount>), AppError> {
    input.validate()?;
    let discount = state.gateway.create_discount(&input).await?;
    Ok((StatusCode::CREATED, Json(discount)))
}

/// PUT /discounts/:id
pub async fn update_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateDiscount>,
) -> Result<Json<Discount>, AppError> {
    let discount = state
        .gateway
        .update_discount(id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Discount not found")))?;
    Ok(Json(discount))
}

/// DELETE /discounts/:id
pub async fn delete_discount(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.gateway.delete_discount(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!("Discount not found")))
    }
}

/// Request to price a code against a subtotal before checkout.
#[derive(Debug, Deserialize)]
pub struct PreviewDiscountRequest {
    pub code: String,
    pub subtotal: Decimal,
}

/// Preview response: what the code would take off right now.
#[derive(Debug, Serialize)]
pub struct PreviewDiscountResponse {
    pub code: String,
    pub discount_amount: Decimal,
    pub total: Decimal,
}

/// Validate a code against a subtotal without consuming a use.
///
/// POST /discounts/preview
pub async fn preview_discount(
    State(state): State<AppState>,
    Json(req): Json<PreviewDiscountRequest>,
) -> Result<Json<PreviewDiscountResponse>, AppError> {
    let (discount, amount) =
        discounts::resolve(state.gateway.as_ref(), &req.code, req.subtotal).await?;
    Ok(Json(PreviewDiscountResponse {
        code: discount.code,
        discount_amount: amount,
        total: req.subtotal - amount,
    }))
}
