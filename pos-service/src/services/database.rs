//! PostgreSQL-backed persistence gateway for pos-service.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use retail_core::error::AppError;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    ActivityLog, Category, CategoryInput, CreateActivity, CreateDiscount, CreateInventoryItem,
    CreatePurchaseReceipt, CreateSale, Customer, CustomerInput, Discount, InventoryItem,
    ListInventoryFilter, OrderStatus, PurchaseOrder, PurchaseOrderItem, PurchaseReceipt, Sale,
    SettingRow, Supplier, SupplierInput, UpdateDiscount, UpdateInventoryItem,
};
use crate::services::gateway::Gateway;
use crate::services::metrics::DB_QUERY_DURATION;

const INVENTORY_COLUMNS: &str = "id, part_name, part_number, category, category_id, supplier_id, \
     brand, year_range, quantity, cost_price, selling_price, reorder_level, created_at, updated_at";

const SALE_COLUMNS: &str = "id, inventory_id, quantity_sold, unit_price, total_price, sold_by, \
     customer_id, discount_id, discount_amount, receipt_number, created_at";

const DISCOUNT_COLUMNS: &str = "id, code, description, discount_type, discount_value, \
     min_purchase, max_uses, used_count, is_active, valid_from, valid_until, created_at, updated_at";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "pos-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

fn db_err(context: &str, e: sqlx::Error) -> AppError {
    AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e))
}

#[async_trait]
impl Gateway for Database {
    // -- inventory ---------------------------------------------------------

    #[instrument(skip(self, filter))]
    async fn list_inventory(
        &self,
        filter: &ListInventoryFilter,
    ) -> Result<Vec<InventoryItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_inventory"])
            .start_timer();

        let search = filter
            .search
            .as_ref()
            .map(|s| format!("%{}%", s.to_lowercase()));

        let items = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            SELECT {INVENTORY_COLUMNS}
            FROM inventory
            WHERE ($1::text IS NULL OR lower(part_name) LIKE $1 OR lower(part_number) LIKE $1)
              AND ($2::bool = FALSE OR quantity <= reorder_level)
              AND ($3::bool = FALSE OR quantity > 0)
            ORDER BY part_name
            "#
        ))
        .bind(&search)
        .bind(filter.low_stock)
        .bind(filter.in_stock)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list inventory", e))?;

        timer.observe_duration();

        Ok(items)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn get_inventory_item(&self, id: Uuid) -> Result<Option<InventoryItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_inventory_item"])
            .start_timer();

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to get inventory item", e))?;

        timer.observe_duration();

        Ok(item)
    }

    #[instrument(skip(self))]
    async fn find_inventory_by_part_number(
        &self,
        part_number: &str,
    ) -> Result<Option<InventoryItem>, AppError> {
        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            "SELECT {INVENTORY_COLUMNS} FROM inventory WHERE part_number = $1"
        ))
        .bind(part_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to find inventory by part number", e))?;

        Ok(item)
    }

    #[instrument(skip(self, input))]
    async fn create_inventory_item(
        &self,
        input: &CreateInventoryItem,
    ) -> Result<InventoryItem, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_inventory_item"])
            .start_timer();

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            INSERT INTO inventory (
                id, part_name, part_number, category, category_id, supplier_id,
                brand, year_range, quantity, cost_price, selling_price, reorder_level
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&input.part_name)
        .bind(&input.part_number)
        .bind(&input.category)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(&input.brand)
        .bind(&input.year_range)
        .bind(input.quantity)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.reorder_level)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                anyhow::anyhow!("Part number '{}' already exists", input.part_number),
            ),
            _ => db_err("Failed to create inventory item", e),
        })?;

        timer.observe_duration();

        info!(id = %item.id, part_number = %item.part_number, "Inventory item created");

        Ok(item)
    }

    #[instrument(skip(self, input), fields(id = %id))]
    async fn update_inventory_item(
        &self,
        id: Uuid,
        input: &UpdateInventoryItem,
    ) -> Result<Option<InventoryItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_inventory_item"])
            .start_timer();

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
            SET part_name = COALESCE($2, part_name),
                part_number = COALESCE($3, part_number),
                category = COALESCE($4, category),
                category_id = COALESCE($5, category_id),
                supplier_id = COALESCE($6, supplier_id),
                brand = COALESCE($7, brand),
                year_range = COALESCE($8, year_range),
                quantity = COALESCE($9, quantity),
                cost_price = COALESCE($10, cost_price),
                selling_price = COALESCE($11, selling_price),
                reorder_level = COALESCE($12, reorder_level),
                updated_at = now()
            WHERE id = $1
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&input.part_name)
        .bind(&input.part_number)
        .bind(&input.category)
        .bind(input.category_id)
        .bind(input.supplier_id)
        .bind(&input.brand)
        .bind(&input.year_range)
        .bind(input.quantity)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.reorder_level)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update inventory item", e))?;

        timer.observe_duration();

        Ok(item)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_inventory_item(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM inventory WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete inventory item", e))?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(id = %id, delta = delta))]
    async fn adjust_inventory_quantity(
        &self,
        id: Uuid,
        delta: i32,
    ) -> Result<Option<InventoryItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["adjust_inventory_quantity"])
            .start_timer();

        let item = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
            SET quantity = quantity + $2, updated_at = now()
            WHERE id = $1
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(delta)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to adjust inventory quantity", e))?;

        timer.observe_duration();

        Ok(item)
    }

    #[instrument(skip(self), fields(id = %id, quantity = quantity))]
    async fn decrement_inventory_with_floor(
        &self,
        id: Uuid,
        quantity: i32,
    ) -> Result<InventoryItem, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["decrement_inventory_with_floor"])
            .start_timer();

        let updated = sqlx::query_as::<_, InventoryItem>(&format!(
            r#"
            UPDATE inventory
            SET quantity = quantity - $2, updated_at = now()
            WHERE id = $1 AND quantity >= $2
            RETURNING {INVENTORY_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to decrement inventory", e))?;

        timer.observe_duration();

        match updated {
            Some(item) => Ok(item),
            // Distinguish a missing row from an insufficient one.
            None => match self.get_inventory_item(id).await? {
                Some(item) => Err(AppError::InsufficientStock {
                    part_name: item.part_name,
                    requested: quantity,
                    available: item.quantity,
                }),
                None => Err(AppError::NotFound(anyhow::anyhow!(
                    "Inventory item {} not found",
                    id
                ))),
            },
        }
    }

    // -- catalog -----------------------------------------------------------

    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, name, description, created_at FROM categories ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list categories", e))
    }

    #[instrument(skip(self, input))]
    async fn create_category(&self, input: &CategoryInput) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Category '{}' already exists", input.name))
            }
            _ => db_err("Failed to create category", e),
        })
    }

    #[instrument(skip(self, input), fields(id = %id))]
    async fn update_category(
        &self,
        id: Uuid,
        input: &CategoryInput,
    ) -> Result<Option<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description, created_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update category", e))
    }

    async fn delete_category(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete category", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        sqlx::query_as::<_, Supplier>(
            "SELECT id, name, contact_person, phone, email, address, created_at \
             FROM suppliers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list suppliers", e))
    }

    #[instrument(skip(self, input))]
    async fn create_supplier(&self, input: &SupplierInput) -> Result<Supplier, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (id, name, contact_person, phone, email, address)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, contact_person, phone, email, address, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to create supplier", e))
    }

    #[instrument(skip(self, input), fields(id = %id))]
    async fn update_supplier(
        &self,
        id: Uuid,
        input: &SupplierInput,
    ) -> Result<Option<Supplier>, AppError> {
        sqlx::query_as::<_, Supplier>(
            r#"
            UPDATE suppliers
            SET name = $2, contact_person = $3, phone = $4, email = $5, address = $6
            WHERE id = $1
            RETURNING id, name, contact_person, phone, email, address, created_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.contact_person)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update supplier", e))
    }

    async fn delete_supplier(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM suppliers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete supplier", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, address, created_at FROM customers ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list customers", e))
    }

    async fn get_customer(&self, id: Uuid) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, email, address, created_at FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to get customer", e))
    }

    #[instrument(skip(self, input))]
    async fn create_customer(&self, input: &CustomerInput) -> Result<Customer, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, name, phone, email, address)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, phone, email, address, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to create customer", e))
    }

    #[instrument(skip(self, input), fields(id = %id))]
    async fn update_customer(
        &self,
        id: Uuid,
        input: &CustomerInput,
    ) -> Result<Option<Customer>, AppError> {
        sqlx::query_as::<_, Customer>(
            r#"
            UPDATE customers SET name = $2, phone = $3, email = $4, address = $5
            WHERE id = $1
            RETURNING id, name, phone, email, address, created_at
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.phone)
        .bind(&input.email)
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update customer", e))
    }

    async fn delete_customer(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete customer", e))?;
        Ok(result.rows_affected() > 0)
    }

    // -- discounts ---------------------------------------------------------

    async fn list_discounts(&self) -> Result<Vec<Discount>, AppError> {
        sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list discounts", e))
    }

    async fn get_discount(&self, id: Uuid) -> Result<Option<Discount>, AppError> {
        sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to get discount", e))
    }

    #[instrument(skip(self))]
    async fn find_discount_by_code(&self, code: &str) -> Result<Option<Discount>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["find_discount_by_code"])
            .start_timer();

        let discount = sqlx::query_as::<_, Discount>(&format!(
            "SELECT {DISCOUNT_COLUMNS} FROM discounts WHERE code = $1"
        ))
        .bind(code.trim().to_uppercase())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to find discount", e))?;

        timer.observe_duration();

        Ok(discount)
    }

    #[instrument(skip(self, input))]
    async fn create_discount(&self, input: &CreateDiscount) -> Result<Discount, AppError> {
        sqlx::query_as::<_, Discount>(&format!(
            r#"
            INSERT INTO discounts (
                id, code, description, discount_type, discount_value,
                min_purchase, max_uses, is_active, valid_from, valid_until
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {DISCOUNT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.code.trim().to_uppercase())
        .bind(&input.description)
        .bind(input.discount_type.as_str())
        .bind(input.discount_value)
        .bind(input.min_purchase)
        .bind(input.max_uses)
        .bind(input.is_active)
        .bind(input.valid_from)
        .bind(input.valid_until)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                anyhow::anyhow!("Discount code '{}' already exists", input.code),
            ),
            _ => db_err("Failed to create discount", e),
        })
    }

    #[instrument(skip(self, input), fields(id = %id))]
    async fn update_discount(
        &self,
        id: Uuid,
        input: &UpdateDiscount,
    ) -> Result<Option<Discount>, AppError> {
        sqlx::query_as::<_, Discount>(&format!(
            r#"
            UPDATE discounts
            SET code = COALESCE($2, code),
                description = COALESCE($3, description),
                discount_type = COALESCE($4, discount_type),
                discount_value = COALESCE($5, discount_value),
                min_purchase = COALESCE($6, min_purchase),
                max_uses = COALESCE($7, max_uses),
                used_count = COALESCE($8, used_count),
                is_active = COALESCE($9, is_active),
                valid_from = COALESCE($10, valid_from),
                valid_until = COALESCE($11, valid_until),
                updated_at = now()
            WHERE id = $1
            RETURNING {DISCOUNT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(input.code.as_ref().map(|c| c.trim().to_uppercase()))
        .bind(&input.description)
        .bind(input.discount_type.map(|t| t.as_str()))
        .bind(input.discount_value)
        .bind(input.min_purchase)
        .bind(input.max_uses)
        .bind(input.used_count)
        .bind(input.is_active)
        .bind(input.valid_from)
        .bind(input.valid_until)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update discount", e))
    }

    async fn delete_discount(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM discounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete discount", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn increment_discount_usage(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE discounts SET used_count = used_count + 1, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to increment discount usage", e))?;
        Ok(())
    }

    // -- sales -------------------------------------------------------------

    #[instrument(skip(self, input), fields(receipt_number = %input.receipt_number))]
    async fn insert_sale(&self, input: &CreateSale) -> Result<Sale, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_sale"])
            .start_timer();

        let sale = sqlx::query_as::<_, Sale>(&format!(
            r#"
            INSERT INTO pos_sales (
                id, inventory_id, quantity_sold, unit_price, total_price, sold_by,
                customer_id, discount_id, discount_amount, receipt_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {SALE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(input.inventory_id)
        .bind(input.quantity_sold)
        .bind(input.unit_price)
        .bind(input.total_price)
        .bind(input.sold_by)
        .bind(input.customer_id)
        .bind(input.discount_id)
        .bind(input.discount_amount)
        .bind(&input.receipt_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to insert sale", e))?;

        timer.observe_duration();

        Ok(sale)
    }

    #[instrument(skip(self))]
    async fn list_sales_by_receipt(&self, receipt_number: &str) -> Result<Vec<Sale>, AppError> {
        sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM pos_sales WHERE receipt_number = $1 ORDER BY created_at"
        ))
        .bind(receipt_number)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list sales by receipt", e))
    }

    #[instrument(skip(self))]
    async fn delete_sales_by_receipt(&self, receipt_number: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM pos_sales WHERE receipt_number = $1")
            .bind(receipt_number)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to delete sales by receipt", e))?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn list_sales_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sale>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_sales_between"])
            .start_timer();

        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM pos_sales \
             WHERE created_at >= $1 AND created_at < $2 ORDER BY created_at"
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list sales", e))?;

        timer.observe_duration();

        Ok(sales)
    }

    // -- purchasing --------------------------------------------------------

    #[instrument(skip(self, notes))]
    async fn insert_purchase_order(
        &self,
        order_number: &str,
        supplier_id: Uuid,
        total_amount: Decimal,
        notes: Option<&str>,
        ordered_by: Option<Uuid>,
    ) -> Result<PurchaseOrder, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_purchase_order"])
            .start_timer();

        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (id, order_number, supplier_id, status, total_amount, notes, ordered_by)
            VALUES ($1, $2, $3, 'pending', $4, $5, $6)
            RETURNING id, order_number, supplier_id, status, total_amount, notes, ordered_by, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order_number)
        .bind(supplier_id)
        .bind(total_amount)
        .bind(notes)
        .bind(ordered_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => AppError::Conflict(
                anyhow::anyhow!("Order number '{}' already exists", order_number),
            ),
            _ => db_err("Failed to insert purchase order", e),
        })?;

        timer.observe_duration();

        info!(order_number = %order.order_number, "Purchase order created");

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
        sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            INSERT INTO purchase_order_items (
                id, purchase_order_id, inventory_id, part_name, part_number,
                quantity_ordered, unit_cost
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, purchase_order_id, inventory_id, part_name, part_number,
                quantity_ordered, quantity_received, unit_cost
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(purchase_order_id)
        .bind(inventory_id)
        .bind(part_name)
        .bind(part_number)
        .bind(quantity_ordered)
        .bind(unit_cost)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to insert order item", e))
    }

    async fn list_purchase_orders(&self) -> Result<Vec<PurchaseOrder>, AppError> {
        sqlx::query_as::<_, PurchaseOrder>(
            "SELECT id, order_number, supplier_id, status, total_amount, notes, ordered_by, created_at \
             FROM purchase_orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list purchase orders", e))
    }

    async fn get_purchase_order(&self, id: Uuid) -> Result<Option<PurchaseOrder>, AppError> {
        sqlx::query_as::<_, PurchaseOrder>(
            "SELECT id, order_number, supplier_id, status, total_amount, notes, ordered_by, created_at \
             FROM purchase_orders WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to get purchase order", e))
    }

    async fn list_order_items(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Vec<PurchaseOrderItem>, AppError> {
        sqlx::query_as::<_, PurchaseOrderItem>(
            "SELECT id, purchase_order_id, inventory_id, part_name, part_number, \
             quantity_ordered, quantity_received, unit_cost \
             FROM purchase_order_items WHERE purchase_order_id = $1",
        )
        .bind(purchase_order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list order items", e))
    }

    async fn get_order_item(&self, id: Uuid) -> Result<Option<PurchaseOrderItem>, AppError> {
        sqlx::query_as::<_, PurchaseOrderItem>(
            "SELECT id, purchase_order_id, inventory_id, part_name, part_number, \
             quantity_ordered, quantity_received, unit_cost \
             FROM purchase_order_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to get order item", e))
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn set_order_item_received(
        &self,
        id: Uuid,
        quantity_received: i32,
    ) -> Result<Option<PurchaseOrderItem>, AppError> {
        sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            UPDATE purchase_order_items SET quantity_received = $2
            WHERE id = $1
            RETURNING id, purchase_order_id, inventory_id, part_name, part_number,
                quantity_ordered, quantity_received, unit_cost
            "#,
        )
        .bind(id)
        .bind(quantity_received)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("Failed to update order item", e))
    }

    #[instrument(skip(self, input))]
    async fn insert_purchase_receipt(
        &self,
        input: &CreatePurchaseReceipt,
    ) -> Result<PurchaseReceipt, AppError> {
        sqlx::query_as::<_, PurchaseReceipt>(
            r#"
            INSERT INTO purchase_receipts (
                id, purchase_order_id, purchase_order_item_id, quantity_received, received_by
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, purchase_order_id, purchase_order_item_id, quantity_received,
                received_by, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.purchase_order_id)
        .bind(input.purchase_order_item_id)
        .bind(input.quantity_received)
        .bind(input.received_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("Failed to insert purchase receipt", e))
    }

    async fn list_purchase_receipts(
        &self,
        purchase_order_id: Uuid,
    ) -> Result<Vec<PurchaseReceipt>, AppError> {
        sqlx::query_as::<_, PurchaseReceipt>(
            "SELECT id, purchase_order_id, purchase_order_item_id, quantity_received, \
             received_by, created_at \
             FROM purchase_receipts WHERE purchase_order_id = $1 ORDER BY created_at",
        )
        .bind(purchase_order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list purchase receipts", e))
    }

    #[instrument(skip(self), fields(id = %id, status = status.as_str()))]
    async fn set_order_status(&self, id: Uuid, status: OrderStatus) -> Result<(), AppError> {
        sqlx::query("UPDATE purchase_orders SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Failed to set order status", e))?;
        Ok(())
    }

    // -- settings ----------------------------------------------------------

    async fn load_settings(&self) -> Result<Vec<SettingRow>, AppError> {
        sqlx::query_as::<_, SettingRow>("SELECT key, value FROM settings")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| db_err("Failed to load settings", e))
    }

    #[instrument(skip(self, value))]
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO settings (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to upsert setting", e))?;
        Ok(())
    }

    // -- activity ----------------------------------------------------------

    async fn insert_activity(&self, input: &CreateActivity) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO activity_logs (id, user_id, user_email, action, entity_type, entity_id, details)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.user_id)
        .bind(&input.user_email)
        .bind(&input.action)
        .bind(&input.entity_type)
        .bind(input.entity_id)
        .bind(&input.details)
        .execute(&self.pool)
        .await
        .map_err(|e| db_err("Failed to insert activity", e))?;
        Ok(())
    }

    async fn list_activity(&self, limit: i64) -> Result<Vec<ActivityLog>, AppError> {
        sqlx::query_as::<_, ActivityLog>(
            "SELECT id, user_id, user_email, action, entity_type, entity_id, details, created_at \
             FROM activity_logs ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit.clamp(1, 500))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Failed to list activity", e))
    }
}
