//! Discount code resolution and amount computation.
//!
//! Rejections are checked in a fixed order so the caller always sees the
//! most fundamental problem first: unknown/inactive code, then expiry,
//! then usage cap, then minimum purchase.

use retail_core::error::{AppError, DiscountRejection};
use rust_decimal::Decimal;
use tracing::instrument;

use crate::models::{Discount, DiscountType};
use crate::services::gateway::Gateway;

/// Resolve `code` against the current subtotal. Returns the discount row
/// and the monetary amount it takes off. Does NOT bump `used_count`;
/// that happens exactly once when a checkout commits.
#[instrument(skip(gateway), fields(code = %code))]
pub async fn resolve(
    gateway: &dyn Gateway,
    code: &str,
    subtotal: Decimal,
) -> Result<(Discount, Decimal), AppError> {
    let discount = gateway
        .find_discount_by_code(code)
        .await?
        .filter(|d| d.is_active)
        .ok_or(DiscountRejection::NotFound)?;

    let now = chrono::Utc::now();
    if let Some(valid_until) = discount.valid_until {
        if valid_until < now {
            return Err(DiscountRejection::Expired.into());
        }
    }
    if let Some(max_uses) = discount.max_uses {
        if discount.used_count >= max_uses {
            return Err(DiscountRejection::UsageExceeded.into());
        }
    }
    if let Some(min_purchase) = discount.min_purchase {
        if subtotal < min_purchase {
            return Err(DiscountRejection::MinimumNotMet {
                subtotal,
                min_purchase,
            }
            .into());
        }
    }

    let amount = compute_amount(&discount, subtotal);
    Ok((discount, amount))
}

/// Monetary value of `discount` against `subtotal`, rounded to cents.
/// A fixed discount is capped at the subtotal; the result is never
/// negative.
pub fn compute_amount(discount: &Discount, subtotal: Decimal) -> Decimal {
    let raw = match discount.discount_type() {
        DiscountType::Percentage => {
            subtotal * discount.discount_value / Decimal::from(100)
        }
        DiscountType::Fixed => discount.discount_value.min(subtotal),
    };
    raw.round_dp(2).max(Decimal::ZERO)
}

/// Split `discount_amount` across `line_totals` in proportion to each
/// line's share of the subtotal. Per-line shares are rounded to cents;
/// the rounding remainder lands on the last line so the shares sum
/// exactly to `discount_amount`.
pub fn prorate(discount_amount: Decimal, line_totals: &[Decimal]) -> Vec<Decimal> {
    let subtotal: Decimal = line_totals.iter().copied().sum();
    if subtotal <= Decimal::ZERO || line_totals.is_empty() {
        return vec![Decimal::ZERO; line_totals.len()];
    }
    let mut shares: Vec<Decimal> = line_totals
        .iter()
        .map(|line| (discount_amount * line / subtotal).round_dp(2))
        .collect();
    let allocated: Decimal = shares.iter().copied().sum();
    if let Some(last) = shares.last_mut() {
        *last += discount_amount - allocated;
    }
    shares
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn discount(discount_type: DiscountType, value: Decimal) -> Discount {
        Discount {
            id: Uuid::new_v4(),
            code: "SAVE10".to_string(),
            description: None,
            discount_type: discount_type.as_str().to_string(),
            discount_value: value,
            min_purchase: None,
            max_uses: None,
            used_count: 0,
            is_active: true,
            valid_from: None,
            valid_until: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn percentage_discount_rounds_to_cents() {
        let d = discount(DiscountType::Percentage, dec!(10));
        assert_eq!(compute_amount(&d, dec!(30.00)), dec!(3.00));
        assert_eq!(compute_amount(&d, dec!(33.33)), dec!(3.33));
    }

    #[test]
    fn fixed_discount_is_capped_at_subtotal() {
        let d = discount(DiscountType::Fixed, dec!(50.00));
        assert_eq!(compute_amount(&d, dec!(20.00)), dec!(20.00));
        assert_eq!(compute_amount(&d, dec!(80.00)), dec!(50.00));
    }

    #[test]
    fn proration_shares_sum_exactly() {
        let lines = vec![dec!(10.00), dec!(10.00), dec!(10.00)];
        let shares = prorate(dec!(10.00), &lines);
        assert_eq!(shares.iter().copied().sum::<Decimal>(), dec!(10.00));
        assert_eq!(shares[0], dec!(3.33));
        assert_eq!(shares[1], dec!(3.33));
        assert_eq!(shares[2], dec!(3.34));
    }

    #[test]
    fn proration_of_zero_subtotal_is_all_zeroes() {
        let shares = prorate(dec!(5.00), &[Decimal::ZERO, Decimal::ZERO]);
        assert!(shares.iter().all(|s| s.is_zero()));
    }
}
