//! Full-receipt refunds.
//!
//! A refund restores every unit sold under a receipt number back to
//! stock and removes the sale rows. Refunds are additive adjustments,
//! so they cannot conflict with concurrent sales. The discount's usage
//! counter is intentionally left alone.

use retail_core::error::AppError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::CreateActivity;
use crate::services::gateway::Gateway;
use crate::services::metrics;

/// Outcome of a completed refund.
#[derive(Debug, Clone, Serialize)]
pub struct RefundSummary {
    pub receipt_number: String,
    pub lines_refunded: u64,
    pub units_restored: i64,
    pub amount_refunded: Decimal,
}

/// Refund every sale row under `receipt_number`.
#[instrument(skip(gateway))]
pub async fn refund_receipt(
    gateway: &dyn Gateway,
    receipt_number: &str,
    refunded_by: Uuid,
) -> Result<RefundSummary, AppError> {
    let sales = gateway.list_sales_by_receipt(receipt_number).await?;
    if sales.is_empty() {
        metrics::record_refund("not_found");
        return Err(AppError::NotFound(anyhow::anyhow!(
            "No sale found for receipt {}",
            receipt_number
        )));
    }

    let mut units_restored: i64 = 0;
    let mut amount_refunded = Decimal::ZERO;
    for sale in &sales {
        match gateway
            .adjust_inventory_quantity(sale.inventory_id, sale.quantity_sold)
            .await?
        {
            Some(_) => units_restored += i64::from(sale.quantity_sold),
            None => {
                // Item deleted since the sale; nothing to restore into.
                warn!(
                    inventory_id = %sale.inventory_id,
                    quantity = sale.quantity_sold,
                    "Refunded item no longer exists, stock not restored"
                );
            }
        }
        amount_refunded += sale.total_price;
    }

    let lines_refunded = gateway.delete_sales_by_receipt(receipt_number).await?;

    let activity = CreateActivity {
        user_id: Some(refunded_by),
        user_email: None,
        action: "sale_refunded".to_string(),
        entity_type: "sale".to_string(),
        entity_id: None,
        details: Some(serde_json::json!({
            "receipt_number": receipt_number,
            "amount": amount_refunded,
            "units": units_restored,
        })),
    };
    if let Err(err) = gateway.insert_activity(&activity).await {
        warn!(error = %err, "Failed to record refund activity");
    }

    metrics::record_refund("completed");
    metrics::record_sale_amount("refund", -amount_refunded.to_f64().unwrap_or_default());
    info!(
        receipt_number,
        lines_refunded,
        units_restored,
        %amount_refunded,
        "Refund completed"
    );
    Ok(RefundSummary {
        receipt_number: receipt_number.to_string(),
        lines_refunded,
        units_restored,
        amount_refunded,
    })
}
