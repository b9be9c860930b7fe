//! In-memory cart for an active point-of-sale session.
//!
//! The cart works on inventory snapshots taken at add time: line prices
//! and the stock ceiling come from the snapshot, not from a live query.
//! Stock is re-validated atomically at commit time, so a stale snapshot
//! can never oversell.

use retail_core::error::AppError;
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::{HeldLine, InventoryItem};

/// One cart line: item snapshot plus quantity.
#[derive(Debug, Clone, Serialize)]
pub struct CartLine {
    pub item: InventoryItem,
    pub quantity: i32,
}

impl CartLine {
    pub fn line_total(&self) -> Decimal {
        self.item.selling_price * Decimal::from(self.quantity)
    }
}

/// An active cart. Quantities are clamped to the snapshot's stock level.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a cart from a held-order snapshot.
    pub fn from_held(lines: Vec<HeldLine>) -> Self {
        Self {
            lines: lines
                .into_iter()
                .map(|l| CartLine {
                    item: l.item,
                    quantity: l.quantity,
                })
                .collect(),
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of `quantity * selling_price` across lines.
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Snapshot the lines for a held order.
    pub fn to_held_lines(&self) -> Vec<HeldLine> {
        self.lines
            .iter()
            .map(|l| HeldLine {
                item: l.item.clone(),
                quantity: l.quantity,
            })
            .collect()
    }

    /// Add one unit of `item`, merging into an existing line.
    pub fn add_item(&mut self, item: InventoryItem) -> Result<(), AppError> {
        if let Some(line) = self.lines.iter_mut().find(|l| l.item.id == item.id) {
            if line.quantity + 1 > line.item.quantity {
                return Err(AppError::InsufficientStock {
                    part_name: line.item.part_name.clone(),
                    requested: line.quantity + 1,
                    available: line.item.quantity,
                });
            }
            line.quantity += 1;
            return Ok(());
        }
        if item.quantity < 1 {
            return Err(AppError::InsufficientStock {
                part_name: item.part_name.clone(),
                requested: 1,
                available: item.quantity,
            });
        }
        self.lines.push(CartLine { item, quantity: 1 });
        Ok(())
    }

    /// Set a line's quantity outright. Rejects non-positive quantities and
    /// quantities above the snapshot's stock.
    pub fn set_quantity(&mut self, inventory_id: Uuid, quantity: i32) -> Result<(), AppError> {
        let Some(line) = self.lines.iter_mut().find(|l| l.item.id == inventory_id) else {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Item {} is not in the cart",
                inventory_id
            )));
        };
        if quantity < 1 {
            return Err(AppError::ValidationError(
                "quantity must be at least 1".to_string(),
            ));
        }
        if quantity > line.item.quantity {
            return Err(AppError::InsufficientStock {
                part_name: line.item.part_name.clone(),
                requested: quantity,
                available: line.item.quantity,
            });
        }
        line.quantity = quantity;
        Ok(())
    }

    /// Nudge a line's quantity by `delta` (negative to decrease), with the
    /// same floor and ceiling as [`set_quantity`](Self::set_quantity).
    pub fn adjust_quantity(&mut self, inventory_id: Uuid, delta: i32) -> Result<(), AppError> {
        let current = self
            .lines
            .iter()
            .find(|l| l.item.id == inventory_id)
            .map(|l| l.quantity)
            .ok_or_else(|| {
                AppError::NotFound(anyhow::anyhow!("Item {} is not in the cart", inventory_id))
            })?;
        self.set_quantity(inventory_id, current + delta)
    }

    /// Remove a line entirely. Returns whether a line was removed.
    pub fn remove_item(&mut self, inventory_id: Uuid) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.item.id != inventory_id);
        self.lines.len() < before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn item(quantity: i32, price: Decimal) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            part_name: "Brake Pad".to_string(),
            part_number: format!("BP-{}", Uuid::new_v4()),
            category: "Brakes".to_string(),
            category_id: None,
            supplier_id: None,
            brand: None,
            year_range: None,
            quantity,
            cost_price: dec!(4.00),
            selling_price: price,
            reorder_level: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn adding_same_item_twice_merges_lines() {
        let mut cart = Cart::new();
        let it = item(5, dec!(10.00));
        cart.add_item(it.clone()).unwrap();
        cart.add_item(it).unwrap();
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.subtotal(), dec!(20.00));
    }

    #[test]
    fn add_beyond_snapshot_stock_is_rejected() {
        let mut cart = Cart::new();
        let it = item(1, dec!(10.00));
        cart.add_item(it.clone()).unwrap();
        let err = cart.add_item(it).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { .. }));
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn out_of_stock_item_cannot_be_added() {
        let mut cart = Cart::new();
        let err = cart.add_item(item(0, dec!(10.00))).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn quantity_floor_and_ceiling_are_enforced() {
        let mut cart = Cart::new();
        let it = item(3, dec!(7.50));
        let id = it.id;
        cart.add_item(it).unwrap();

        assert!(matches!(
            cart.set_quantity(id, 0),
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            cart.set_quantity(id, 4),
            Err(AppError::InsufficientStock { .. })
        ));
        cart.set_quantity(id, 3).unwrap();
        assert_eq!(cart.subtotal(), dec!(22.50));
    }

    #[test]
    fn adjust_below_one_is_rejected() {
        let mut cart = Cart::new();
        let it = item(3, dec!(7.50));
        let id = it.id;
        cart.add_item(it).unwrap();
        assert!(cart.adjust_quantity(id, -1).is_err());
        assert_eq!(cart.lines()[0].quantity, 1);
        cart.adjust_quantity(id, 2).unwrap();
        assert_eq!(cart.lines()[0].quantity, 3);
    }

    #[test]
    fn remove_and_clear() {
        let mut cart = Cart::new();
        let it = item(5, dec!(1.00));
        let id = it.id;
        cart.add_item(it).unwrap();
        assert!(cart.remove_item(id));
        assert!(!cart.remove_item(id));
        cart.add_item(item(5, dec!(1.00))).unwrap();
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal(), Decimal::ZERO);
    }
}
