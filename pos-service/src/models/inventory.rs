//! Inventory item model for pos-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A stocked auto part.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InventoryItem {
    pub id: Uuid,
    pub part_name: String,
    pub part_number: String,
    pub category: String,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub brand: Option<String>,
    pub year_range: Option<String>,
    pub quantity: i32,
    pub cost_price: Decimal,
    pub selling_price: Decimal,
    pub reorder_level: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InventoryItem {
    /// An item is low-stock once quantity drops to its reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }

    /// Total cost value of the units on hand.
    pub fn stock_value(&self) -> Decimal {
        self.cost_price * Decimal::from(self.quantity)
    }
}

/// Input for creating an inventory item.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateInventoryItem {
    pub part_name: String,
    pub part_number: String,
    #[serde(default)]
    pub category: String,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub brand: Option<String>,
    pub year_range: Option<String>,
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub selling_price: Decimal,
    #[serde(default)]
    pub reorder_level: i32,
}

impl CreateInventoryItem {
    pub fn validate(&self) -> Result<(), retail_core::error::AppError> {
        if self.part_name.trim().is_empty() {
            return Err(retail_core::error::AppError::ValidationError(
                "part_name is required".to_string(),
            ));
        }
        if self.part_number.trim().is_empty() {
            return Err(retail_core::error::AppError::ValidationError(
                "part_number is required".to_string(),
            ));
        }
        if self.quantity < 0 || self.reorder_level < 0 {
            return Err(retail_core::error::AppError::ValidationError(
                "quantity and reorder_level must not be negative".to_string(),
            ));
        }
        if self.selling_price < Decimal::ZERO || self.cost_price < Decimal::ZERO {
            return Err(retail_core::error::AppError::ValidationError(
                "prices must not be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input for updating an inventory item. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateInventoryItem {
    pub part_name: Option<String>,
    pub part_number: Option<String>,
    pub category: Option<String>,
    pub category_id: Option<Uuid>,
    pub supplier_id: Option<Uuid>,
    pub brand: Option<String>,
    pub year_range: Option<String>,
    pub quantity: Option<i32>,
    pub cost_price: Option<Decimal>,
    pub selling_price: Option<Decimal>,
    pub reorder_level: Option<i32>,
}

/// Filter parameters for listing inventory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListInventoryFilter {
    /// Matches part_name or part_number, case-insensitive substring.
    pub search: Option<String>,
    /// Only items at or below their reorder level.
    #[serde(default)]
    pub low_stock: bool,
    /// Only items with quantity > 0 (the POS item grid).
    #[serde(default)]
    pub in_stock: bool,
}
