//! Inventory handlers.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{CreateInventoryItem, InventoryItem, ListInventoryFilter, UpdateInventoryItem};
use crate::startup::AppState;
use retail_core::error::AppError;

/// List inventory, optionally filtered.
///
/// GET /inventory
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(filter): Query<ListInventoryFilter>,
) -> Result<Json<Vec<InventoryItem>>, AppError> {
    let items = state.gateway.list_inventory(&filter).await?;
    Ok(Json(items))
}

/// Get one inventory item.
///
/// GET /inventory/:id
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, AppError> {
    let item = state
        .gateway
        .get_inventory_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Inventory item not found")))?;
    Ok(Json(item))
}

/// Create an inventory item.
///
/// POST /inventory
pub async fn create_inventory_item(
    State(state): State<AppState>,
    Json(input): Json<CreateInventoryItem>,
) -> Result<(StatusCode, Json<InventoryItem>), AppError> {
    input.validate()?;
    let item = state.gateway.create_inventory_item(&input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Update an inventory item.
///
/// PUT /inventory/:id
pub async fn update_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateInventoryItem>,
) -> Result<Json<InventoryItem>, AppError> {
    let item = state
        .gateway
        .update_inventory_item(id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Inventory item not found")))?;
    Ok(Json(item))
}

/// Delete an inventory item.
///
/// DELETE /inventory/:id
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.gateway.delete_inventory_item(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(anyhow::anyhow!(
            "Inventory item not found"
        )))
    }
}

/// Request to nudge an item's stock level.
#[derive(Debug, Deserialize)]
pub struct AdjustQuantityRequest {
    pub delta: i32,
}

/// Adjust an item's quantity by a delta (manual stock correction).
///
/// POST /inventory/:id/adjust
pub async fn adjust_inventory_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AdjustQuantityRequest>,
) -> Result<Json<InventoryItem>, AppError> {
    let current = state
        .gateway
        .get_inventory_item(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Inventory item not found")))?;
    if current.quantity + req.delta < 0 {
        return Err(AppError::ValidationError(
            "adjustment would make quantity negative".to_string(),
        ));
    }
    let item = state
        .gateway
        .adjust_inventory_quantity(id, req.delta)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Inventory item not found")))?;
    Ok(Json(item))
}
