//! Sale row model for pos-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One sale row per cart line of a completed checkout. All rows of one
/// checkout share a receipt number. Rows are immutable once written;
/// only the refund processor removes them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    pub inventory_id: Uuid,
    pub quantity_sold: i32,
    pub unit_price: Decimal,
    /// Post-discount, pro-rated line total.
    pub total_price: Decimal,
    pub sold_by: Uuid,
    pub customer_id: Option<Uuid>,
    pub discount_id: Option<Uuid>,
    pub discount_amount: Option<Decimal>,
    pub receipt_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for inserting a sale row.
#[derive(Debug, Clone)]
pub struct CreateSale {
    pub inventory_id: Uuid,
    pub quantity_sold: i32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub sold_by: Uuid,
    pub customer_id: Option<Uuid>,
    pub discount_id: Option<Uuid>,
    pub discount_amount: Option<Decimal>,
    pub receipt_number: String,
}
