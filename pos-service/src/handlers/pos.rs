//! Point-of-sale handlers: checkout, refunds and held orders.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{HeldLine, HeldOrder};
use crate::services::cart::Cart;
use crate::services::checkout::{checkout, CheckoutRequest};
use crate::services::receipts::{render_text, Receipt};
use crate::services::refunds::{refund_receipt, RefundSummary};
use crate::startup::AppState;
use retail_core::error::AppError;

/// One requested cart line.
#[derive(Debug, Deserialize)]
pub struct CheckoutLine {
    pub inventory_id: Uuid,
    pub quantity: i32,
}

/// Full checkout request: the lines plus sale metadata.
#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub lines: Vec<CheckoutLine>,
    #[serde(flatten)]
    pub request: CheckoutRequest,
}

/// Checkout response: the structured receipt and its printable form.
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub receipt: Receipt,
    pub printable: String,
}

/// Build a cart from requested lines against current stock snapshots.
async fn build_cart(state: &AppState, lines: &[CheckoutLine]) -> Result<Cart, AppError> {
    let mut cart = Cart::new();
    for line in lines {
        let item = state
            .gateway
            .get_inventory_item(line.inventory_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!(
                    "Inventory item {} not found",
                    line.inventory_id
                ))
            })?;
        let id = item.id;
        cart.add_item(item)?;
        if line.quantity != 1 {
            cart.set_quantity(id, line.quantity)?;
        }
    }
    Ok(cart)
}

/// Commit a sale.
///
/// POST /pos/checkout
pub async fn checkout_handler(
    State(state): State<AppState>,
    Json(body): Json<CheckoutBody>,
) -> Result<(StatusCode, Json<CheckoutResponse>), AppError> {
    let cart = build_cart(&state, &body.lines).await?;
    let settings = state.settings.read().await.clone();
    let receipt = checkout(state.gateway.as_ref(), &cart, &body.request, &settings).await?;
    let printable = render_text(&receipt, &settings);
    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse { receipt, printable }),
    ))
}

/// Request to refund a whole receipt.
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub receipt_number: String,
    pub refunded_by: Uuid,
}

/// Refund every sale row under a receipt.
///
/// POST /pos/refunds
pub async fn refund_handler(
    State(state): State<AppState>,
    Json(req): Json<RefundRequest>,
) -> Result<Json<RefundSummary>, AppError> {
    let summary =
        refund_receipt(state.gateway.as_ref(), &req.receipt_number, req.refunded_by).await?;
    Ok(Json(summary))
}

// ============================================================================
// Held orders
// ============================================================================

/// Request to suspend the current cart.
#[derive(Debug, Deserialize)]
pub struct HoldRequest {
    pub lines: Vec<CheckoutLine>,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub discount_code: Option<String>,
    pub note: Option<String>,
}

/// GET /pos/holds
pub async fn list_holds(State(state): State<AppState>) -> Result<Json<Vec<HeldOrder>>, AppError> {
    let store = state.held.read().await;
    Ok(Json(store.list().to_vec()))
}

/// Suspend a cart for later.
///
/// POST /pos/holds
pub async fn hold_order(
    State(state): State<AppState>,
    Json(req): Json<HoldRequest>,
) -> Result<(StatusCode, Json<HeldOrder>), AppError> {
    let cart = build_cart(&state, &req.lines).await?;
    let lines: Vec<HeldLine> = cart.to_held_lines();
    let mut store = state.held.write().await;
    let order = store.hold(
        lines,
        req.customer_id,
        req.customer_name,
        req.discount_code,
        req.note,
    )?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Take a held order out of the store for resumption. The caller gets
/// the snapshot back; stock is re-validated at checkout, not here.
///
/// POST /pos/holds/:id/resume
pub async fn resume_hold(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HeldOrder>, AppError> {
    let mut store = state.held.write().await;
    let order = store.resume(id)?;
    Ok(Json(order))
}

/// DELETE /pos/holds/:id
pub async fn delete_hold(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let mut store = state.held.write().await;
    if store.remove(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!("Held order not found")))
    }
}
