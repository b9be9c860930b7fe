//! Checkout commit flow.
//!
//! A checkout validates the discount, then commits one line at a time:
//! atomic stock decrement followed by the sale row insert. If any line
//! fails, already-committed lines are compensated (stock restored, sale
//! rows deleted) so a partial checkout leaves no trace. The discount's
//! usage counter is bumped exactly once, after every line has landed.

use retail_core::error::AppError;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{CreateActivity, CreateSale, Discount, StoreSettings};
use crate::numbers;
use crate::services::cart::Cart;
use crate::services::discounts;
use crate::services::gateway::Gateway;
use crate::services::metrics;
use crate::services::receipts::{Receipt, ReceiptLine};

/// Phase of a checkout, for log correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckoutState {
    Validating,
    Committing,
    Receipted,
    Failed,
}

impl CheckoutState {
    fn as_str(&self) -> &'static str {
        match self {
            CheckoutState::Validating => "validating",
            CheckoutState::Committing => "committing",
            CheckoutState::Receipted => "receipted",
            CheckoutState::Failed => "failed",
        }
    }
}

/// Checkout parameters beyond the cart itself.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub cashier_id: Uuid,
    pub cashier_name: Option<String>,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub discount_code: Option<String>,
    pub payment_method: String,
}

/// Commit `cart` as one sale. Returns the printable receipt.
#[instrument(skip(gateway, cart, settings), fields(cashier_id = %request.cashier_id))]
pub async fn checkout(
    gateway: &dyn Gateway,
    cart: &Cart,
    request: &CheckoutRequest,
    settings: &StoreSettings,
) -> Result<Receipt, AppError> {
    if cart.is_empty() {
        return Err(AppError::ValidationError("cart is empty".to_string()));
    }
    if request.payment_method.trim().is_empty() {
        return Err(AppError::ValidationError(
            "payment_method is required".to_string(),
        ));
    }

    info!(state = CheckoutState::Validating.as_str(), "Checkout started");
    let subtotal = cart.subtotal();
    let discount: Option<(Discount, Decimal)> = match &request.discount_code {
        Some(code) => Some(discounts::resolve(gateway, code, subtotal).await?),
        None => None,
    };
    let discount_amount = discount
        .as_ref()
        .map(|(_, amount)| *amount)
        .unwrap_or(Decimal::ZERO);

    let receipt_number = numbers::receipt_number();
    let line_totals: Vec<Decimal> = cart.lines().iter().map(|l| l.line_total()).collect();
    let shares = discounts::prorate(discount_amount, &line_totals);

    info!(
        state = CheckoutState::Committing.as_str(),
        receipt_number = %receipt_number,
        lines = cart.lines().len(),
        "Committing checkout"
    );
    let discount_id = discount.as_ref().map(|(d, _)| d.id);
    let mut decremented: Vec<(Uuid, i32)> = Vec::with_capacity(cart.lines().len());
    for (line, share) in cart.lines().iter().zip(shares.iter()) {
        if let Err(err) =
            commit_line(gateway, line, discount_id, *share, &receipt_number, request).await
        {
            warn!(
                state = CheckoutState::Failed.as_str(),
                receipt_number = %receipt_number,
                error = %err,
                "Checkout line failed, compensating"
            );
            compensate(gateway, &receipt_number, &decremented).await;
            metrics::record_checkout("failed");
            metrics::record_error("checkout_line", "checkout");
            return Err(err);
        }
        decremented.push((line.item.id, line.quantity));
    }

    if let Some((discount, _)) = &discount {
        gateway.increment_discount_usage(discount.id).await?;
    }

    let discounted = subtotal - discount_amount;
    let (tax_amount, total) = Receipt::apply_tax(discounted, settings.tax_rate);
    let receipt = Receipt {
        receipt_number: receipt_number.clone(),
        created_at: chrono::Utc::now(),
        lines: cart
            .lines()
            .iter()
            .zip(shares.iter())
            .map(|(line, share)| ReceiptLine {
                part_name: line.item.part_name.clone(),
                part_number: line.item.part_number.clone(),
                brand: line.item.brand.clone(),
                year_range: line.item.year_range.clone(),
                quantity: line.quantity,
                unit_price: line.item.selling_price,
                line_total: line.line_total() - share,
            })
            .collect(),
        subtotal,
        discount_code: discount.as_ref().map(|(d, _)| d.code.clone()),
        discount_amount,
        tax_rate: settings.tax_rate,
        tax_amount,
        total,
        payment_method: request.payment_method.clone(),
        cashier_name: request.cashier_name.clone(),
        customer_name: request.customer_name.clone(),
    };

    let activity = CreateActivity {
        user_id: Some(request.cashier_id),
        user_email: request.cashier_name.clone(),
        action: "sale_completed".to_string(),
        entity_type: "sale".to_string(),
        entity_id: None,
        details: Some(serde_json::json!({
            "receipt_number": receipt_number,
            "total": total,
            "lines": cart.lines().len(),
        })),
    };
    if let Err(err) = gateway.insert_activity(&activity).await {
        warn!(error = %err, "Failed to record checkout activity");
    }

    metrics::record_checkout("completed");
    metrics::record_sale_amount(
        &request.payment_method,
        total.to_f64().unwrap_or_default(),
    );
    info!(
        state = CheckoutState::Receipted.as_str(),
        receipt_number = %receipt_number,
        %total,
        "Checkout completed"
    );
    Ok(receipt)
}

async fn commit_line(
    gateway: &dyn Gateway,
    line: &crate::services::cart::CartLine,
    discount_id: Option<Uuid>,
    discount_share: Decimal,
    receipt_number: &str,
    request: &CheckoutRequest,
) -> Result<(), AppError> {
    gateway
        .decrement_inventory_with_floor(line.item.id, line.quantity)
        .await?;
    let sale = CreateSale {
        inventory_id: line.item.id,
        quantity_sold: line.quantity,
        unit_price: line.item.selling_price,
        total_price: line.line_total() - discount_share,
        sold_by: request.cashier_id,
        customer_id: request.customer_id,
        discount_id,
        discount_amount: discount_id.map(|_| discount_share),
        receipt_number: receipt_number.to_string(),
    };
    gateway.insert_sale(&sale).await?;
    Ok(())
}

/// Undo a partially-committed checkout: restore decremented stock and
/// drop any sale rows already written under this receipt. Best effort;
/// failures are logged, not propagated.
async fn compensate(gateway: &dyn Gateway, receipt_number: &str, decremented: &[(Uuid, i32)]) {
    for (inventory_id, quantity) in decremented {
        if let Err(err) = gateway
            .adjust_inventory_quantity(*inventory_id, *quantity)
            .await
        {
            warn!(
                %inventory_id,
                quantity,
                error = %err,
                "Compensation could not restore stock"
            );
        }
    }
    match gateway.delete_sales_by_receipt(receipt_number).await {
        Ok(removed) if removed > 0 => {
            info!(receipt_number, removed, "Compensation removed sale rows");
        }
        Ok(_) => {}
        Err(err) => {
            warn!(
                receipt_number,
                error = %err,
                "Compensation could not delete sale rows"
            );
        }
    }
}
