//! In-memory persistence gateway.
//!
//! Backs engine and HTTP tests, mirroring the PostgreSQL gateway's
//! observable behavior (ordering, conflict mapping, floor checks)
//! without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retail_core::error::AppError;
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::{
    ActivityLog, Category, CategoryInput, CreateActivity, CreateDiscount, CreateInventoryItem,
    CreatePurchaseReceipt, CreateSale, Customer, CustomerInput, Discount, InventoryItem,
    ListInventoryFilter, OrderStatus, PurchaseOrder, PurchaseOrderItem, PurchaseReceipt, Sale,
    SettingRow, Supplier, SupplierInput, UpdateDiscount, UpdateInventoryItem,
};
use crate::services::gateway::Gateway;

#[derive(Default)]
struct State {
    inventory: Vec<InventoryItem>,
    categories: Vec<Category>,
    suppliers: Vec<Supplier>,
    customers: Vec<Customer>,
    discounts: Vec<Discount>,
    sales: Vec<Sale>,
    purchase_orders: Vec<PurchaseOrder>,
    order_items: Vec<PurchaseOrderItem>,
    purchase_receipts: Vec<PurchaseReceipt>,
    settings: Vec<SettingRow>,
    activity: Vec<ActivityLog>,
}

/// Gateway over in-process state.
#[derive(Default)]
pub struct MemoryGateway {
    state: RwLock<State>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    // -- inventory ---------------------------------------------------------

    async fn list_inventory(
        &self,
        filter: &ListInventoryFilter,
    ) -> Result<Vec<InventoryItem>, AppError> {
        let state = self.state.read().await;
        let needle = filter.search.as_ref().map(|s| s.to_lowercase());
        let mut items: Vec<InventoryItem> = state
            .inventory
            .iter()
            .filter(|item| {
                needle.as_ref().map_or(true, |n| {
                    item.part_name.to_lowercase().contains(n)
                        || item.part_number.to_lowercase().contains(n)
                })
            })
            .filter(|item| !filter.low_stock || item.is_low_stock())
            .filter(|item| !filter.in_stock || item.quantity > 0)
            .cloned()
            .collect();
        items.sort_by(|a, b| a.part_name.cmp(&b.part_name));
        Ok(items)
    }

    async fn get_inventory_item(&self, id: Uuid) -> Result<Option<InventoryItem>, AppError> {
        let state = self.state.read().await;
        Ok(state.inventory.iter().find(|i| i.id == id).cloned())
    }

    async fn find_inventory_by_part_number(
        &self,
        part_number: &str,
    ) -> Result<Option<InventoryItem>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .inventory
            .iter()
            .find(|i| i.part_number == part_number)
            .cloned())
    }

    async fn create_inventory_item(
        &self,
        input: &CreateInventoryItem,
    ) -> Result<InventoryItem, AppError> {
        let mut state = self.state.write().await;
        if state
            .inventory
            .iter()
            .any(|i| i.part_number == input.part_number)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Part number '{}' already exists",
                input.part_number
            )));
        }
        let now = Utc::now();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            part_name: input.part_name.clone(),
            part_number: input.part_number.clone(),
            category: input.category.clone(),
            category_id: input.category_id,
            supplier_id: input.supplier_id,
            brand: input.brand.clone(),
            year_range: input.year_range.clone(),
            quantity: input.quantity,
            cost_price: input.cost_price,
            selling_price: input.selling_price,
            reorder_level: input.reorder_level,
            created_at: now,
            updated_at: now,
        };
        state.inventory.push(item.clone());
        Ok(item)
    }

    async fn update_inventory_item(
        &self,
        id: Uuid,
        input: &UpdateInventoryItem,
    ) -> Result<Option<InventoryItem>, AppError> {
        let mut state = self.state.write().await;
        let Some(item) = state.inventory.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &input.part_name {
            item.part_name = v.clone();
        }
        if let Some(v) = &input.part_number {
            item.part_number = v.clone();
        }
        if let Some(v) = &input.category {
            item.category = v.clone();
        }
        if let Some(v) = input.category_id {
            item.category_id = Some(v);
        }
        if let Some(v) = input.supplier_id {
            item.supplier_id = Some(v);
        }
        if let Some(v) = &input.brand {
            item.brand = Some(v.clone());
        }
        if let Some(v) = &input.year_range {
            item.year_range = Some(v.clone());
        }
        if let Some(v) = input.quantity {
            item.quantity = v;
        }
        if let Some(v) = input.cost_price {
            item.cost_price = v;
        }
        if let Some(v) = input.selling_price {
            item.selling_price = v;
        }
        if let Some(v) = input.reorder_level {
            item.reorder_level = v;
        }
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete_inventory_item(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.inventory.len();
        state.inventory.retain(|i| i.id != id);
        Ok(state.inventory.len() < before)
    }

    async fn adjust_inventory_quantity(
        &self,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<InventoryItem>, AppError> {
        let mut state = self.state.write().await;
        let Some(item) = state.inventory.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        item.quantity += delta;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn decrement_inventory_with_floor(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<InventoryItem, AppError> {
        let mut state = self.state.write().await;
        let Some(item) = state.inventory.iter_mut().find(|i| i.id == id) else {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Inventory item {} not found",
                id
            )));
        };
        if item.quantity < quantity {
            return Err(AppError::InsufficientStock {
                part_name: item.part_name.clone(),
                requested: quantity,
                available: item.quantity,
            });
        }
        item.quantity -= quantity;
        item.updated_at = Utc::now();
        Ok(item.clone())
    }

    // -- catalog -----------------------------------------------------------

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let state = self.state.read().await;
        let mut out = state.categories.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn create_category(&self, input: &CategoryInput) -> Result<Category, AppError> {
        let mut state = self.state.write().await;
        if state.categories.iter().any(|c| c.name == input.name) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Category '{}' already exists",
                input.name
            )));
        }
        let category = Category {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            description: input.description.clone(),
            created_at: Utc::now(),
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: Uuid,
        input: &CategoryInput,
    ) -> Result<Option<Category>, AppError> {
        let mut state = self.state.write().await;
        let Some(category) = state.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        category.name = input.name.clone();
        category.description = input.description.clone();
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.categories.len();
        state.categories.retain(|c| c.id != id);
        Ok(state.categories.len() < before)
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        let state = self.state.read().await;
        let mut out = state.suppliers.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn create_supplier(&self, input: &SupplierInput) -> Result<Supplier, AppError> {
        let mut state = self.state.write().await;
        let supplier = Supplier {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            contact_person: input.contact_person.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            created_at: Utc::now(),
        };
        state.suppliers.push(supplier.clone());
        Ok(supplier)
    }

    async fn update_supplier(
        &self,
        id: Uuid,
        input: &SupplierInput,
    ) -> Result<Option<Supplier>, AppError> {
        let mut state = self.state.write().await;
        let Some(supplier) = state.suppliers.iter_mut().find(|s| s.id == id) else {
            return Ok(None);
        };
        supplier.name = input.name.clone();
        supplier.contact_person = input.contact_person.clone();
        supplier.phone = input.phone.clone();
        supplier.email = input.email.clone();
        supplier.address = input.address.clone();
        Ok(Some(supplier.clone()))
    }

    async fn delete_supplier(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.suppliers.len();
        state.suppliers.retain(|s| s.id != id);
        Ok(state.suppliers.len() < before)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let state = self.state.read().await;
        let mut out = state.customers.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        let state = self.state.read().await;
        Ok(state.customers.iter().find(|c| c.id == id).cloned())
    }

    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, AppError> {
        let mut state = self.state.write().await;
        let customer = Customer {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
            address: input.address.clone(),
            created_at: Utc::now(),
        };
        state.customers.push(customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError> {
        let mut state = self.state.write().await;
        let Some(customer) = state.customers.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        customer.name = input.name.clone();
        customer.phone = input.phone.clone();
        customer.email = input.email.clone();
        customer.address = input.address.clone();
        Ok(Some(customer.clone()))
    }

    async fn delete_customer(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.customers.len();
        state.customers.retain(|c| c.id != id);
        Ok(state.customers.len() < before)
    }

    // -- discounts ---------------------------------------------------------

    async fn list_discounts(&self) -> Result<Vec<Discount>, AppError> {
        let state = self.state.read().await;
        let mut out = state.discounts.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>, AppError> {
        let state = self.state.read().await;
        Ok(state.discounts.iter().find(|d| d.id == id).cloned())
    }

    async fn find_discount_by_code(&self, code: &str) -> Result<Option<Discount>, AppError> {
        let code = code.trim().to_uppercase();
        let state = self.state.read().await;
        Ok(state.discounts.iter().find(|d| d.code == code).cloned())
    }

    async fn create_discount(&self, input: &CreateDiscount) -> Result<Discount, AppError> {
        let code = input.code.trim().to_uppercase();
        let mut state = self.state.write().await;
        if state.discounts.iter().any(|d| d.code == code) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Discount code '{}' already exists",
                input.code
            )));
        }
        let now = Utc::now();
        let discount = Discount {
            id: Uuid::new_v4(),
            code,
            description: input.description.clone(),
            discount_type: input.discount_type.as_str().to_string(),
            discount_value: input.discount_value,
            min_purchase: input.min_purchase,
            max_uses: input.max_uses,
            used_count: 0,
            is_active: input.is_active,
            valid_from: input.valid_from,
            valid_until: input.valid_until,
            created_at: now,
            updated_at: now,
        };
        state.discounts.push(discount.clone());
        Ok(discount)
    }

    async fn update_discount(
        &self,
        id: Uuid,
        input: &UpdateDiscount,
    ) -> Result<Option<Discount>, AppError> {
        let mut state = self.state.write().await;
        let Some(discount) = state.discounts.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        if let Some(v) = &input.code {
            discount.code = v.trim().to_uppercase();
        }
        if let Some(v) = &input.description {
            discount.description = Some(v.clone());
        }
        if let Some(v) = input.discount_type {
            discount.discount_type = v.as_str().to_string();
        }
        if let Some(v) = input.discount_value {
            discount.discount_value = v;
        }
        if let Some(v) = input.min_purchase {
            discount.min_purchase = Some(v);
        }
        if let Some(v) = input.max_uses {
            discount.max_uses = Some(v);
        }
        if let Some(v) = input.used_count {
            discount.used_count = v;
        }
        if let Some(v) = input.is_active {
            discount.is_active = v;
        }
        if let Some(v) = input.valid_from {
            discount.valid_from = Some(v);
        }
        if let Some(v) = input.valid_until {
            discount.valid_until = Some(v);
        }
        discount.updated_at = Utc::now();
        Ok(Some(discount.clone()))
    }

    async fn delete_discount(&self, id: Uuid) -> Result<bool, AppError> {
        let mut state = self.state.write().await;
        let before = state.discounts.len();
        state.discounts.retain(|d| d.id != id);
        Ok(state.discounts.len() < before)
    }

    async fn increment_discount_usage(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if let Some(discount) = state.discounts.iter_mut().find(|d| d.id == id) {
            discount.used_count += 1;
            discount.updated_at = Utc::now();
        }
        Ok(())
    }

    // -- sales -------------------------------------------------------------

    async fn insert_sale(&self, input: &CreateSale) -> Result<Sale, AppError> {
        let mut state = self.state.write().await;
        let sale = Sale {
            id: Uuid::new_v4(),
            inventory_id: input.inventory_id,
            quantity_sold: input.quantity_sold,
            unit_price: input.unit_price,
            total_price: input.total_price,
            sold_by: input.sold_by,
            customer_id: input.customer_id,
            discount_id: input.discount_id,
            discount_amount: input.discount_amount,
            receipt_number: Some(input.receipt_number.clone()),
            created_at: Utc::now(),
        };
        state.sales.push(sale.clone());
        Ok(sale)
    }

    async fn list_sales_by_receipt(&self, receipt_number: &str) -> Result<Vec<Sale>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .sales
            .iter()
            .filter(|s| s.receipt_number.as_deref() == Some(receipt_number))
            .cloned()
            .collect())
    }

    async fn delete_sales_by_receipt(&self, receipt_number: &str) -> Result<u64, AppError> {
        let mut state = self.state.write().await;
        let before = state.sales.len();
        state
            .sales
            .retain(|s| s.receipt_number.as_deref() != Some(receipt_number));
        Ok((before - state.sales.len()) as u64)
    }

    async fn list_sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sale>, AppError> {
        let state = self.state.read().await;
        let mut sales: Vec<Sale> = state
            .sales
            .iter()
            .filter(|s| s.created_at >= from && s.created_at < to)
            .cloned()
            .collect();
        sales.sort_by_key(|s| s.created_at);
        Ok(sales)
    }

    // -- purchasing --------------------------------------------------------

    async fn insert_purchase_order(
        &self,
        order_number: &str,
        supplier_id: Uuid,
        total_amount: Decimal,
        notes: Option<&str>,
        ordered_by: Option<Uuid>,
    ) -> Result<PurchaseOrder, AppError> {
        let mut state = self.state.write().await;
        if state
            .purchase_orders
            .iter()
            .any(|o| o.order_number == order_number)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Order number '{}' already exists",
                order_number
            )));
        }
        let order = PurchaseOrder {
            id: Uuid::new_v4(),
            order_number: order_number.to_string(),
            supplier_id: Some(supplier_id),
            status: OrderStatus::Pending.as_str().to_string(),
            total_amount,
            notes: notes.map(|s| s.to_string()),
            ordered_by,
            created_at: Utc::now(),
        };
        state.purchase_orders.push(order.clone());
        Ok(order)
    }

    async fn insert_order_item(
        &self,
        purchase_order_id: Uuid,
        inventory_id: Option<Uuid>,
        part_name: &str,
        part_number: Option<&str>,
        quantity_ordered: i32,
        unit_cost: Decimal,
    ) -> Result<PurchaseOrderItem, AppError> {
        let mut state = self.state.write().await;
        let item = PurchaseOrderItem {
            id: Uuid::new_v4(),
            purchase_order_id,
            inventory_id,
            part_name: part_name.to_string(),
            part_number: part_number.map(|s| s.to_string()),
            quantity_ordered,
            quantity_received: 0,
            unit_cost,
        };
        state.order_items.push(item.clone());
        Ok(item)
    }

    async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        let state = self.state.read().await;
        let mut out = state.purchase_orders.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out)
    }

    async fn get_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>, AppError> {
        let state = self.state.read().await;
        Ok(state.purchase_orders.iter().find(|o| o.id == id).cloned())
    }

    async fn list_order_items(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Vec<PurchaseOrderItem>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .order_items
            .iter()
            .filter(|i| i.purchase_order_id == purchase_order_id)
            .cloned()
            .collect())
    }

    async fn get_order_item(&self, id: Uuid) -> Result<Option<PurchaseOrderItem>, AppError> {
        let state = self.state.read().await;
        Ok(state.order_items.iter().find(|i| i.id == id).cloned())
    }

    async fn set_order_item_received(
        &self,
        id: Uuid,
        quantity_received: i32,
    ) -> Result<Option<PurchaseOrderItem>, AppError> {
        let mut state = self.state.write().await;
        let Some(item) = state.order_items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };
        item.quantity_received = quantity_received;
        Ok(Some(item.clone()))
    }

    async fn insert_purchase_receipt(
        &self,
        input: &CreatePurchaseReceipt,
    ) -> Result<PurchaseReceipt, AppError> {
        let mut state = self.state.write().await;
        let receipt = PurchaseReceipt {
            id: Uuid::new_v4(),
            purchase_order_id: input.purchase_order_id,
            purchase_order_item_id: input.purchase_order_item_id,
            quantity_received: input.quantity_received,
            received_by: input.received_by,
            created_at: Utc::now(),
        };
        state.purchase_receipts.push(receipt.clone());
        Ok(receipt)
    }

    async fn list_purchase_receipts(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Vec<PurchaseReceipt>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .purchase_receipts
            .iter()
            .filter(|r| r.purchase_order_id == purchase_order_id)
            .cloned()
            .collect())
    }

    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if let Some(order) = state.purchase_orders.iter_mut().find(|o| o.id == id) {
            order.status = status.as_str().to_string();
        }
        Ok(())
    }

    // -- settings ----------------------------------------------------------

    async fn load_settings(&self) -> Result<Vec<SettingRow>, AppError> {
        let state = self.state.read().await;
        Ok(state.settings.clone())
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        if let Some(row) = state.settings.iter_mut().find(|r| r.key == key) {
            row.value = Some(value.to_string());
        } else {
            state.settings.push(SettingRow {
                key: key.to_string(),
                value: Some(value.to_string()),
            });
        }
        Ok(())
    }

    // -- activity ----------------------------------------------------------

    async fn insert_activity(&self, input: &CreateActivity) -> Result<(), AppError> {
        let mut state = self.state.write().await;
        let entry = ActivityLog {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            user_email: input.user_email.clone(),
            action: input.action.clone(),
            entity_type: input.entity_type.clone(),
            entity_id: input.entity_id,
            details: input.details.clone(),
            created_at: Utc::now(),
        };
        state.activity.push(entry);
        Ok(())
    }

    async fn list_activity(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        let state = self.state.read().await;
        let mut out = state.activity.clone();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        out.truncate(limit.clamp(1, 500) as usize);
        Ok(out)
    }
}
