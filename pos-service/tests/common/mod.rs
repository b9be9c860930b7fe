//! Test helper module for pos-service integration tests.
//!
//! Spawns the HTTP application over the in-memory gateway so tests need
//! neither PostgreSQL nor any other external service.

#![allow(dead_code)]

use std::sync::Arc;

use pos_service::config::{DatabaseConfig, PosConfig};
use pos_service::models::{CreateDiscount, CreateInventoryItem, DiscountType, InventoryItem};
use pos_service::services::{Gateway, MemoryGateway};
use pos_service::startup::Application;
use retail_core::config::Config as CoreConfig;
use rust_decimal::Decimal;

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub gateway: Arc<MemoryGateway>,
    // Holds the held-order store directory open for the app's lifetime.
    _held_dir: tempfile::TempDir,
}

impl TestApp {
    /// Spawn a new test application on a random port.
    pub async fn spawn() -> Self {
        let held_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = PosConfig {
            common: CoreConfig { port: 0 },
            service_name: "pos-service-test".to_string(),
            log_level: "warn".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: "postgres://unused".to_string(),
                max_connections: 5,
                min_connections: 1,
            },
            held_orders_path: held_dir
                .path()
                .join("held_orders.json")
                .to_string_lossy()
                .into_owned(),
        };

        let gateway = Arc::new(MemoryGateway::new());
        let app = Application::build_with_gateway(config, gateway.clone())
            .await
            .expect("Failed to build test application");
        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("http://127.0.0.1:{}/health", port);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            gateway,
            _held_dir: held_dir,
        }
    }

    /// Seed one inventory item.
    pub async fn seed_item(
        &self,
        part_name: &str,
        part_number: &str,
        quantity: i32,
        selling_price: Decimal,
    ) -> InventoryItem {
        self.gateway
            .create_inventory_item(&CreateInventoryItem {
                part_name: part_name.to_string(),
                part_number: part_number.to_string(),
                category: "General".to_string(),
                category_id: None,
                supplier_id: None,
                brand: None,
                year_range: None,
                quantity,
                cost_price: selling_price / Decimal::from(2),
                selling_price,
                reorder_level: 2,
            })
            .await
            .expect("Failed to seed inventory item")
    }

    /// Seed a percentage discount code.
    pub async fn seed_percentage_discount(&self, code: &str, percent: Decimal) {
        self.gateway
            .create_discount(&CreateDiscount {
                code: code.to_string(),
                description: None,
                discount_type: DiscountType::Percentage,
                discount_value: percent,
                min_purchase: None,
                max_uses: None,
                is_active: true,
                valid_from: None,
                valid_until: None,
            })
            .await
            .expect("Failed to seed discount");
    }
}

/// Seed helpers for engine-level tests that don't need the HTTP server.
pub async fn seed_item_on(
    gateway: &MemoryGateway,
    part_name: &str,
    part_number: &str,
    quantity: i32,
    selling_price: Decimal,
) -> InventoryItem {
    gateway
        .create_inventory_item(&CreateInventoryItem {
            part_name: part_name.to_string(),
            part_number: part_number.to_string(),
            category: "General".to_string(),
            category_id: None,
            supplier_id: None,
            brand: None,
            year_range: None,
            quantity,
            cost_price: selling_price / Decimal::from(2),
            selling_price,
            reorder_level: 2,
        })
        .await
        .expect("Failed to seed inventory item")
}
