//! Purchase order creation and receiving.
//!
//! Receiving is append-only: every receiving action writes an audit row,
//! bumps the line's received quantity, restocks the matching inventory
//! item and re-derives the order status from the lines.

use retail_core::error::AppError;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{
    CreateActivity, CreatePurchaseOrder, CreatePurchaseReceipt, OrderStatus, PurchaseOrder,
    PurchaseOrderItem,
};
use crate::numbers;
use crate::services::gateway::Gateway;
use crate::services::metrics;

/// A purchase order with its lines.
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
}

/// Create a purchase order and its lines. Lines with a non-positive
/// quantity are dropped; an order with no usable lines is rejected.
#[instrument(skip(gateway, input), fields(supplier_id = %input.supplier_id))]
pub async fn create_order(
    gateway: &dyn Gateway,
    input: &CreatePurchaseOrder,
) -> Result<OrderWithItems, AppError> {
    let lines: Vec<_> = input
        .lines
        .iter()
        .filter(|l| l.quantity_ordered > 0)
        .collect();
    if lines.is_empty() {
        return Err(AppError::ValidationError(
            "a purchase order needs at least one line with a positive quantity".to_string(),
        ));
    }
    for line in &lines {
        if line.part_name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "every order line needs a part name".to_string(),
            ));
        }
    }

    let total_amount = lines
        .iter()
        .map(|l| l.unit_cost * rust_decimal::Decimal::from(l.quantity_ordered))
        .sum();
    let order_number = numbers::order_number();
    let order = gateway
        .insert_purchase_order(
            &order_number,
            input.supplier_id,
            total_amount,
            input.notes.as_deref(),
            input.ordered_by,
        )
        .await?;

    let mut items = Vec::with_capacity(lines.len());
    for line in lines {
        let item = gateway
            .insert_order_item(
                order.id,
                line.inventory_id,
                &line.part_name,
                line.part_number.as_deref(),
                line.quantity_ordered,
                line.unit_cost,
            )
            .await?;
        items.push(item);
    }

    let activity = CreateActivity {
        user_id: input.ordered_by,
        user_email: None,
        action: "purchase_order_created".to_string(),
        entity_type: "purchase_order".to_string(),
        entity_id: Some(order.id),
        details: Some(serde_json::json!({
            "order_number": order_number,
            "lines": items.len(),
            "total_amount": order.total_amount,
        })),
    };
    if let Err(err) = gateway.insert_activity(&activity).await {
        warn!(error = %err, "Failed to record purchase order activity");
    }

    info!(order_number, lines = items.len(), "Purchase order created");
    Ok(OrderWithItems { order, items })
}

/// Record delivery of `quantity` units against one order line.
#[instrument(skip(gateway))]
pub async fn receive(
    gateway: &dyn Gateway,
    order_item_id: Uuid,
    quantity: i32,
    received_by: Option<Uuid>,
) -> Result<PurchaseOrderItem, AppError> {
    if quantity <= 0 {
        return Err(AppError::ValidationError(
            "received quantity must be positive".to_string(),
        ));
    }
    let item = gateway
        .get_order_item(order_item_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Order line {} not found", order_item_id))
        })?;
    let order = gateway
        .get_purchase_order(item.purchase_order_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!(
                "Purchase order {} not found",
                item.purchase_order_id
            ))
        })?;
    if order.status() == OrderStatus::Cancelled {
        return Err(AppError::Conflict(anyhow::anyhow!(
            "Order {} is cancelled and cannot receive stock",
            order.order_number
        )));
    }
    if quantity > item.outstanding() {
        return Err(AppError::ExceedsOrdered {
            part_name: item.part_name.clone(),
            ordered: item.quantity_ordered,
            received: item.quantity_received,
            requested: quantity,
        });
    }

    gateway
        .insert_purchase_receipt(&CreatePurchaseReceipt {
            purchase_order_id: item.purchase_order_id,
            purchase_order_item_id: item.id,
            quantity_received: quantity,
            received_by,
        })
        .await?;
    let updated = gateway
        .set_order_item_received(item.id, item.quantity_received + quantity)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(anyhow::anyhow!("Order line {} disappeared", item.id))
        })?;

    restock(gateway, &updated, quantity).await?;
    refresh_status(gateway, &order).await?;

    let activity = CreateActivity {
        user_id: received_by,
        user_email: None,
        action: "stock_received".to_string(),
        entity_type: "purchase_order".to_string(),
        entity_id: Some(order.id),
        details: Some(serde_json::json!({
            "order_number": order.order_number,
            "part_name": updated.part_name,
            "quantity": quantity,
        })),
    };
    if let Err(err) = gateway.insert_activity(&activity).await {
        warn!(error = %err, "Failed to record receiving activity");
    }

    Ok(updated)
}

/// Route received units into inventory: by the line's inventory link
/// first, then by part number. An unmatched line leaves stock untouched.
async fn restock(
    gateway: &dyn Gateway,
    item: &PurchaseOrderItem,
    quantity: i32,
) -> Result<(), AppError> {
    let target = match item.inventory_id {
        Some(id) => gateway.get_inventory_item(id).await?,
        None => match &item.part_number {
            Some(part_number) => gateway.find_inventory_by_part_number(part_number).await?,
            None => None,
        },
    };
    match target {
        Some(inventory) => {
            gateway
                .adjust_inventory_quantity(inventory.id, quantity)
                .await?;
            metrics::record_items_received(true, quantity as u64);
        }
        None => {
            warn!(
                order_item_id = %item.id,
                part_name = %item.part_name,
                quantity,
                "Received line matches no inventory item, stock not adjusted"
            );
            metrics::record_items_received(false, quantity as u64);
        }
    }
    Ok(())
}

/// Re-derive the order status from its lines and store it if changed.
async fn refresh_status(gateway: &dyn Gateway, order: &PurchaseOrder) -> Result<(), AppError> {
    let items = gateway.list_order_items(order.id).await?;
    let status = derive_status(&items);
    if status != order.status() {
        gateway.set_order_status(order.id, status).await?;
        info!(
            order_number = %order.order_number,
            status = status.as_str(),
            "Order status updated"
        );
    }
    Ok(())
}

/// `complete` when every line is fully received, `partial` when anything
/// has arrived, otherwise `pending`.
pub fn derive_status(items: &[PurchaseOrderItem]) -> OrderStatus {
    if !items.is_empty() && items.iter().all(|i| i.quantity_received >= i.quantity_ordered) {
        return OrderStatus::Complete;
    }
    if items.iter().any(|i| i.quantity_received > 0) {
        return OrderStatus::Partial;
    }
    OrderStatus::Pending
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn item(ordered: i32, received: i32) -> PurchaseOrderItem {
        PurchaseOrderItem {
            id: Uuid::new_v4(),
            purchase_order_id: Uuid::new_v4(),
            inventory_id: None,
            part_name: "Alternator".to_string(),
            part_number: None,
            quantity_ordered: ordered,
            quantity_received: received,
            unit_cost: dec!(40.00),
        }
    }

    #[test]
    fn status_is_pending_until_anything_arrives() {
        assert_eq!(derive_status(&[item(10, 0), item(5, 0)]), OrderStatus::Pending);
    }

    #[test]
    fn status_is_partial_with_mixed_lines() {
        assert_eq!(derive_status(&[item(10, 4), item(5, 0)]), OrderStatus::Partial);
    }

    #[test]
    fn status_is_complete_when_all_lines_are_full() {
        assert_eq!(
            derive_status(&[item(10, 10), item(5, 5)]),
            OrderStatus::Complete
        );
    }

    #[test]
    fn no_lines_means_pending() {
        assert_eq!(derive_status(&[]), OrderStatus::Pending);
    }
}
