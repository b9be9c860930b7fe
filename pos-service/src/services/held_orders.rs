//! Durable store for held (suspended) orders.
//!
//! Held orders belong to the POS device, not the shared database. They
//! are kept in a single JSON file rewritten atomically (write to a temp
//! file, then rename) so a crash mid-save cannot corrupt the store.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use retail_core::error::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{HeldLine, HeldOrder};

/// File-backed collection of held orders.
#[derive(Debug)]
pub struct HeldOrderStore {
    path: PathBuf,
    orders: Vec<HeldOrder>,
}

impl HeldOrderStore {
    /// Open (or create) the store at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        let orders = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)
                .map_err(|e| AppError::InternalError(anyhow::anyhow!(
                    "Held order store at {} is corrupt: {}",
                    path.display(),
                    e
                )))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, orders })
    }

    pub fn list(&self) -> &[HeldOrder] {
        &self.orders
    }

    pub fn get(&self, id: Uuid) -> Option<&HeldOrder> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Suspend a cart. The line snapshots carry full item state so the
    /// resumed cart reproduces hold-time prices.
    #[instrument(skip(self, lines))]
    pub fn hold(
        &mut self,
        lines: Vec<HeldLine>,
        customer_id: Option<Uuid>,
        customer_name: Option<String>,
        discount_code: Option<String>,
        note: Option<String>,
    ) -> Result<HeldOrder, AppError> {
        if lines.is_empty() {
            return Err(AppError::ValidationError(
                "cannot hold an empty cart".to_string(),
            ));
        }
        let order = HeldOrder {
            id: Uuid::new_v4(),
            lines,
            customer_id,
            customer_name,
            discount_code,
            note,
            held_at: Utc::now(),
        };
        self.orders.push(order.clone());
        self.persist()?;
        info!(order_id = %order.id, "Order held");
        Ok(order)
    }

    /// Take a held order out of the store for resumption.
    pub fn resume(&mut self, id: Uuid) -> Result<HeldOrder, AppError> {
        let index = self
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Held order {} not found", id)))?;
        let order = self.orders.remove(index);
        self.persist()?;
        Ok(order)
    }

    /// Discard a held order. Returns whether one was removed.
    pub fn remove(&mut self, id: Uuid) -> Result<bool, AppError> {
        let before = self.orders.len();
        self.orders.retain(|o| o.id != id);
        if self.orders.len() < before {
            self.persist()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn persist(&self) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_vec_pretty(&self.orders)
            .map_err(|e| AppError::InternalError(e.into()))?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, raw)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InventoryItem;
    use rust_decimal_macros::dec;

    fn line() -> HeldLine {
        HeldLine {
            item: InventoryItem {
                id: Uuid::new_v4(),
                part_name: "Spark Plug".to_string(),
                part_number: "SP-1".to_string(),
                category: "Ignition".to_string(),
                category_id: None,
                supplier_id: None,
                brand: None,
                year_range: None,
                quantity: 10,
                cost_price: dec!(1.00),
                selling_price: dec!(3.00),
                reorder_level: 2,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            quantity: 2,
        }
    }

    #[test]
    fn held_orders_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("held.json");

        let mut store = HeldOrderStore::open(&path).unwrap();
        let order = store
            .hold(vec![line()], None, None, None, Some("lunch".to_string()))
            .unwrap();

        let reopened = HeldOrderStore::open(&path).unwrap();
        assert_eq!(reopened.list().len(), 1);
        assert_eq!(reopened.list()[0].id, order.id);
        assert_eq!(reopened.list()[0].note.as_deref(), Some("lunch"));
    }

    #[test]
    fn resume_removes_the_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HeldOrderStore::open(dir.path().join("held.json")).unwrap();
        let order = store.hold(vec![line()], None, None, None, None).unwrap();

        let resumed = store.resume(order.id).unwrap();
        assert_eq!(resumed.lines.len(), 1);
        assert!(store.list().is_empty());
        assert!(matches!(
            store.resume(order.id),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn empty_cart_cannot_be_held() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HeldOrderStore::open(dir.path().join("held.json")).unwrap();
        assert!(matches!(
            store.hold(vec![], None, None, None, None),
            Err(AppError::ValidationError(_))
        ));
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = HeldOrderStore::open(dir.path().join("held.json")).unwrap();
        let order = store.hold(vec![line()], None, None, None, None).unwrap();
        assert!(store.remove(order.id).unwrap());
        assert!(!store.remove(order.id).unwrap());
    }
}
