//! Domain models for pos-service.

mod activity;
mod catalog;
mod discount;
mod held_order;
mod inventory;
mod purchase;
mod sale;
mod settings;

pub use activity::{ActivityLog, CreateActivity};
pub use catalog::{Category, CategoryInput, Customer, CustomerInput, Supplier, SupplierInput};
pub use discount::{CreateDiscount, Discount, DiscountType, UpdateDiscount};
pub use held_order::{HeldLine, HeldOrder};
pub use inventory::{CreateInventoryItem, InventoryItem, ListInventoryFilter, UpdateInventoryItem};
pub use purchase::{
    CreatePurchaseOrder, CreatePurchaseReceipt, NewOrderLine, OrderStatus, PurchaseOrder,
    PurchaseOrderItem, PurchaseReceipt,
};
pub use sale::{CreateSale, Sale};
pub use settings::{SettingRow, StoreSettings};
