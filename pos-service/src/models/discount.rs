//! Discount code model for pos-service.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Discount type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percentage,
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "fixed" => DiscountType::Fixed,
            _ => DiscountType::Percentage,
        }
    }
}

/// A discount code. Codes are stored uppercased and matched
/// case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Discount {
    pub id: Uuid,
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: i32,
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Discount {
    pub fn discount_type(&self) -> DiscountType {
        DiscountType::from_string(&self.discount_type)
    }
}

/// Input for creating a discount code.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDiscount {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: DiscountType,
    pub discount_value: Decimal,
    pub min_purchase: Option<Decimal>,
    pub max_uses: Option<i32>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl CreateDiscount {
    pub fn validate(&self) -> Result<(), retail_core::error::AppError> {
        if self.code.trim().is_empty() {
            return Err(retail_core::error::AppError::ValidationError(
                "code is required".to_string(),
            ));
        }
        if self.discount_value <= Decimal::ZERO {
            return Err(retail_core::error::AppError::ValidationError(
                "discount_value must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Input for updating a discount. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateDiscount {
    pub code: Option<String>,
    pub description: Option<String>,
    pub discount_type: Option<DiscountType>,
    pub discount_value: Option<Decimal>,
    pub min_purchase: Option<Decimal>,
    pub max_uses: Option<i32>,
    pub used_count: Option<i32>,
    pub is_active: Option<bool>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
}
