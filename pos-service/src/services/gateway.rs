//! Persistence gateway contract.
//!
//! Every remote table the service touches is reached through this trait.
//! The production implementation is the PostgreSQL-backed [`Database`];
//! tests run against the in-memory implementation.
//!
//! [`Database`]: crate::services::Database

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retail_core::error::AppError;
use uuid::Uuid;

use crate::models::{
    ActivityLog, Category, CategoryInput, CreateActivity, CreateDiscount, CreateInventoryItem,
    CreatePurchaseReceipt, CreateSale, Customer, CustomerInput, Discount, InventoryItem,
    ListInventoryFilter, OrderStatus, PurchaseOrder, PurchaseOrderItem, PurchaseReceipt, Sale,
    SettingRow, Supplier, SupplierInput, UpdateDiscount, UpdateInventoryItem,
};

/// Row-level CRUD and filtered queries over the retail tables.
#[async_trait]
pub trait Gateway: Send + Sync {
    // -- inventory ---------------------------------------------------------

    async fn list_inventory(
        &self,
        filter: &ListInventoryFilter,
    ) -> Result<Vec<InventoryItem>, AppError>;

    async fn get_inventory_item(&self, id: Uuid) -> Result<Option<InventoryItem>, AppError>;

    async fn find_inventory_by_part_number(
        &self,
        part_number: &str,
    ) -> Result<Option<InventoryItem>, AppError>;

    async fn create_inventory_item(
        &self,
        input: &CreateInventoryItem,
    ) -> Result<InventoryItem, AppError>;

    async fn update_inventory_item(
        &self,
        id: Uuid,
        input: &UpdateInventoryItem,
    ) -> Result<Option<InventoryItem>, AppError>;

    async fn delete_inventory_item(&self, id: Uuid) -> Result<bool, AppError>;

    /// Server-side additive adjustment: `quantity = quantity + delta`.
    /// Used by refunds and receiving so concurrent changes are not lost.
    async fn adjust_inventory_quantity(
        &self,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<InventoryItem>, AppError>;

    /// Atomic decrement with a zero floor. Fails with
    /// [`AppError::InsufficientStock`] when fewer than `quantity` units
    /// remain, without changing anything.
    async fn decrement_inventory_with_floor(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<InventoryItem, AppError>;

    // -- catalog -----------------------------------------------------------

    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, AppError>;
    async fn update_category(
        &self,
        id: Uuid,
        input: &CategoryInput,
    ) -> Result<Option<Category>, AppError>;
    async fn delete_category(&self, id: Uuid) -> Result<bool, AppError>;

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError>;
    async fn create_supplier(&self, input: &SupplierInput) -> Result<Supplier, AppError>;
    async fn update_supplier(
        &self,
        id: Uuid,
        input: &SupplierInput,
    ) -> Result<Option<Supplier>, AppError>;
    async fn delete_supplier(&self, id: Uuid) -> Result<bool, AppError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;
    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, AppError>;
    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, AppError>;
    async fn update_customer(
        &self,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError>;
    async fn delete_customer(&self, id: Uuid) -> Result<bool, AppError>;

    // -- discounts ---------------------------------------------------------

    async fn list_discounts(&self) -> Result<Vec<Discount>, AppError>;

    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>, AppError>;

    /// Case-insensitive code lookup; codes are stored uppercased.
    async fn find_discount_by_code(&self, code: &str) -> Result<Option<Discount>, AppError>;

    async fn create_discount(&self, input: &CreateDiscount) -> Result<Discount, AppError>;

    async fn update_discount(
        &self,
        id: Uuid,
        input: &UpdateDiscount,
    ) -> Result<Option<Discount>, AppError>;

    async fn delete_discount(&self, id: Uuid) -> Result<bool, AppError>;

    /// `used_count = used_count + 1`, exactly once per completed checkout.
    async fn increment_discount_usage(&self, id: Uuid) -> Result<(), AppError>;

    // -- sales -------------------------------------------------------------

    async fn insert_sale(&self, input: &CreateSale) -> Result<Sale, AppError>;

    async fn list_sales_by_receipt(&self, receipt_number: &str) -> Result<Vec<Sale>, AppError>;

    async fn delete_sales_by_receipt(&self, receipt_number: &str) -> Result<u64, AppError>;

    async fn list_sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sale>, AppError>;

    // -- purchasing --------------------------------------------------------

    async fn insert_purchase_order(
        &self,
        order_number: &str,
        supplier_id: Uuid,
        total_amount: rust_decimal::Decimal,
        notes: Option<&str>,
        ordered_by: Option<Uuid>,
    ) -> Result<PurchaseOrder, AppError>;

    async fn insert_order_item(
        &self,
        purchase_order_id: Uuid,
        inventory_id: Option<Uuid>,
        part_name: &str,
        part_number: Option<&str>,
        quantity_ordered: i32,
        unit_cost: rust_decimal::Decimal,
    ) -> Result<PurchaseOrderItem, AppError>;

    async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, AppError>;

    async fn get_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>, AppError>;

    async fn list_order_items(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Vec<PurchaseOrderItem>, AppError>;

    async fn get_order_item(&self, id: Uuid) -> Result<Option<PurchaseOrderItem>, AppError>;

    async fn set_order_item_received(
        &self,
        id: Uuid,
        quantity_received: i32,
    ) -> Result<Option<PurchaseOrderItem>, AppError>;

    async fn insert_purchase_receipt(
        &self,
        input: &CreatePurchaseReceipt,
    ) -> Result<PurchaseReceipt, AppError>;

    async fn list_purchase_receipts(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Vec<PurchaseReceipt>, AppError>;

    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), AppError>;

    // -- settings ----------------------------------------------------------

    async fn load_settings(&self) -> Result<Vec<SettingRow>, AppError>;

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError>;

    // -- activity ----------------------------------------------------------

    async fn insert_activity(&self, input: &CreateActivity) -> Result<(), AppError>;

    async fn list_activity(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError>;
}
