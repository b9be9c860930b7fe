//! Purchase order and receiving handlers.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{CreatePurchaseOrder, OrderStatus, PurchaseOrderItem, PurchaseReceipt};
use crate::services::receiving::{self, OrderWithItems};
use crate::startup::AppState;
use retail_core::error::AppError;

/// GET /purchase-orders
pub async fn list_purchase_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::models::PurchaseOrder>>, AppError> {
    Ok(Json(state.gateway.list_purchase_orders().await?))
}

/// Create a purchase order with its lines.
///
/// POST /purchase-orders
pub async fn create_purchase_order(
    State(state): State<AppState>,
    Json(input): Json<CreatePurchaseOrder>,
) -> Result<(StatusCode, Json<OrderWithItems>), AppError> {
    let order = receiving::create_order(state.gateway.as_ref(), &input).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// Get a purchase order with its lines.
///
/// GET /purchase-orders/:id
pub async fn get_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderWithItems>, AppError> {
    let order = state
        .gateway
        .get_purchase_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Purchase order not found")))?;
    let items = state.gateway.list_order_items(id).await?;
    Ok(Json(OrderWithItems { order, items }))
}

/// Receiving audit trail for an order.
///
/// GET /purchase-orders/:id/receipts
pub async fn list_purchase_receipts(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<PurchaseReceipt>>, AppError> {
    state
        .gateway
        .get_purchase_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Purchase order not found")))?;
    Ok(Json(state.gateway.list_purchase_receipts(id).await?))
}

/// Cancel a purchase order. Completed orders cannot be cancelled.
///
/// POST /purchase-orders/:id/cancel
pub async fn cancel_purchase_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let order = state
        .gateway
        .get_purchase_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Purchase order not found")))?;
    match order.status() {
        OrderStatus::Complete => Err(AppError::Conflict(anyhow::anyhow!(
            "Order {} is already complete",
            order.order_number
        ))),
        OrderStatus::Cancelled => Ok(StatusCode::NO_CONTENT),
        _ => {
            state
                .gateway
                .set_order_status(id, OrderStatus::Cancelled)
                .await?;
            Ok(StatusCode::NO_CONTENT)
        }
    }
}

/// Request to record a delivery against one order line.
#[derive(Debug, Deserialize)]
pub struct ReceiveRequest {
    pub quantity: i32,
    pub received_by: Option<Uuid>,
}

/// Receive stock against an order line.
///
/// POST /order-items/:id/receive
pub async fn receive_order_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReceiveRequest>,
) -> Result<Json<PurchaseOrderItem>, AppError> {
    let item =
        receiving::receive(state.gateway.as_ref(), id, req.quantity, req.received_by).await?;
    Ok(Json(item))
}
