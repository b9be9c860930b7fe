//! Purchase order models for pos-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Purchase order status. `pending → partial → complete` is derived from
/// received quantities; `cancelled` is terminal and only set by explicit
/// action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Partial,
    Complete,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Partial => "partial",
            OrderStatus::Complete => "complete",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "partial" => OrderStatus::Partial,
            "complete" => OrderStatus::Complete,
            "cancelled" => OrderStatus::Cancelled,
            _ => OrderStatus::Pending,
        }
    }
}

/// A supplier purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub order_number: String,
    pub supplier_id: Option<Uuid>,
    pub status: String,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub ordered_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl PurchaseOrder {
    pub fn status(&self) -> OrderStatus {
        OrderStatus::from_string(&self.status)
    }
}

/// A line on a purchase order. `quantity_received` is monotonically
/// non-decreasing and never exceeds `quantity_ordered`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub inventory_id: Option<Uuid>,
    pub part_name: String,
    pub part_number: Option<String>,
    pub quantity_ordered: i32,
    pub quantity_received: i32,
    pub unit_cost: Decimal,
}

impl PurchaseOrderItem {
    pub fn outstanding(&self) -> i32 {
        self.quantity_ordered - self.quantity_received
    }
}

/// Append-only audit row, one per receiving action.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseReceipt {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub purchase_order_item_id: Uuid,
    pub quantity_received: i32,
    pub received_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One requested line of a new purchase order. Lines may reference an
/// inventory item or describe an untracked part by name/number only.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderLine {
    pub inventory_id: Option<Uuid>,
    pub part_name: String,
    pub part_number: Option<String>,
    pub quantity_ordered: i32,
    #[serde(default)]
    pub unit_cost: Decimal,
}

/// Input for creating a purchase order with its lines.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePurchaseOrder {
    pub supplier_id: Uuid,
    pub notes: Option<String>,
    pub ordered_by: Option<Uuid>,
    pub lines: Vec<NewOrderLine>,
}

/// Input for recording a receiving action against an order line.
#[derive(Debug, Clone)]
pub struct CreatePurchaseReceipt {
    pub purchase_order_id: Uuid,
    pub purchase_order_item_id: Uuid,
    pub quantity_received: i32,
    pub received_by: Option<Uuid>,
}
