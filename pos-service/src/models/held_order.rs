//! Held (suspended) order snapshots.
//!
//! Held orders live in a durable local store on the POS device, never in
//! the remote database. A snapshot embeds the full item state at hold
//! time so a resumed cart reproduces add-time prices; stock must be
//! re-validated before checkout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::InventoryItem;

/// One suspended cart line: the item snapshot plus the held quantity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldLine {
    pub item: InventoryItem,
    pub quantity: i32,
}

/// A suspended, not-yet-committed cart saved for later resumption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeldOrder {
    pub id: Uuid,
    pub lines: Vec<HeldLine>,
    pub customer_id: Option<Uuid>,
    pub customer_name: Option<String>,
    pub discount_code: Option<String>,
    pub note: Option<String>,
    pub held_at: DateTime<Utc>,
}
