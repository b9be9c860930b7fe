//! Business services for pos-service.

pub mod cart;
pub mod checkout;
pub mod database;
pub mod discounts;
pub mod gateway;
pub mod held_orders;
pub mod memory;
pub mod metrics;
pub mod receipts;
pub mod receiving;
pub mod refunds;
pub mod reports;

pub use cart::{Cart, CartLine};
pub use checkout::{checkout, CheckoutRequest};
pub use database::Database;
pub use gateway::Gateway;
pub use held_orders::HeldOrderStore;
pub use memory::MemoryGateway;
pub use metrics::{get_metrics, init_metrics};
pub use receipts::{render_text, Receipt, ReceiptLine};
pub use receiving::{create_order, derive_status, receive, OrderWithItems};
pub use refunds::{refund_receipt, RefundSummary};
pub use reports::{DailySales, InventorySummary};
