//! Application startup and lifecycle management.

use crate::config::PosConfig;
use crate::handlers;
use crate::models::StoreSettings;
use crate::services::held_orders::HeldOrderStore;
use crate::services::{get_metrics, init_metrics, Database, Gateway};
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use retail_core::error::AppError;
use retail_core::middleware::tracing::request_id_middleware;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: PosConfig,
    pub gateway: Arc<dyn Gateway>,
    pub settings: Arc<RwLock<StoreSettings>>,
    pub held: Arc<RwLock<HeldOrderStore>>,
}

/// State for health check endpoints.
#[derive(Clone)]
struct HealthState {
    db: Option<Arc<Database>>,
}

/// Health check endpoint for Docker/K8s liveness probes.
async fn health_check(State(state): State<HealthState>) -> impl IntoResponse {
    let db_ok = match &state.db {
        Some(db) => db.health_check().await.err(),
        None => None,
    };
    match db_ok {
        None => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": "pos-service",
                "version": env!("CARGO_PKG_VERSION")
            })),
        ),
        Some(e) => {
            tracing::warn!(error = %e, "Health check failed - database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "service": "pos-service",
                    "error": e.to_string()
                })),
            )
        }
    }
}

/// Readiness check endpoint for K8s readiness probes.
async fn readiness_check(State(state): State<HealthState>) -> impl IntoResponse {
    match &state.db {
        Some(db) => match db.health_check().await {
            Ok(_) => StatusCode::OK,
            Err(e) => {
                tracing::warn!(error = %e, "Readiness check failed");
                StatusCode::SERVICE_UNAVAILABLE
            }
        },
        None => StatusCode::OK,
    }
}

/// Metrics endpoint for Prometheus scraping.
async fn metrics_handler() -> impl IntoResponse {
    let metrics = get_metrics();
    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        metrics,
    )
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    db: Option<Arc<Database>>,
}

impl Application {
    /// Build the application against PostgreSQL, running migrations.
    pub async fn build(config: PosConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build without running migrations (test harnesses apply their own).
    pub async fn build_without_migrations(config: PosConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(config: PosConfig, run_migrations: bool) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        if run_migrations {
            db.run_migrations().await.map_err(|e| {
                tracing::error!(error = %e, "Failed to run migrations");
                e
            })?;
        }

        let db = Arc::new(db);
        Self::assemble(config, db.clone(), Some(db)).await
    }

    /// Build against an arbitrary gateway (in-memory in tests).
    pub async fn build_with_gateway(
        config: PosConfig,
        gateway: Arc<dyn Gateway>,
    ) -> Result<Self, AppError> {
        Self::assemble(config, gateway, None).await
    }

    async fn assemble(
        config: PosConfig,
        gateway: Arc<dyn Gateway>,
        db: Option<Arc<Database>>,
    ) -> Result<Self, AppError> {
        init_metrics();

        let settings = StoreSettings::from_rows(&gateway.load_settings().await?);
        let held = HeldOrderStore::open(&config.held_orders_path)?;

        let state = AppState {
            config: config.clone(),
            gateway,
            settings: Arc::new(RwLock::new(settings)),
            held: Arc::new(RwLock::new(held)),
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "pos-service listener bound");

        Ok(Self {
            port,
            listener,
            state,
            db,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let health_state = HealthState {
            db: self.db.clone(),
        };

        let health_router = Router::new()
            .route("/health", get(health_check))
            .route("/ready", get(readiness_check))
            .route("/metrics", get(metrics_handler))
            .with_state(health_state);

        let api_router = Router::new()
            // Inventory
            .route(
                "/inventory",
                get(handlers::inventory::list_inventory)
                    .post(handlers::inventory::create_inventory_item),
            )
            .route(
                "/inventory/:id",
                get(handlers::inventory::get_inventory_item)
                    .put(handlers::inventory::update_inventory_item)
                    .delete(handlers::inventory::delete_inventory_item),
            )
            .route(
                "/inventory/:id/adjust",
                post(handlers::inventory::adjust_inventory_quantity),
            )
            // Catalog
            .route(
                "/categories",
                get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
            )
            .route(
                "/categories/:id",
                put(handlers::catalog::update_category).delete(handlers::catalog::delete_category),
            )
            .route(
                "/suppliers",
                get(handlers::catalog::list_suppliers).post(handlers::catalog::create_supplier),
            )
            .route(
                "/suppliers/:id",
                put(handlers::catalog::update_supplier).delete(handlers::catalog::delete_supplier),
            )
            .route(
                "/customers",
                get(handlers::catalog::list_customers).post(handlers::catalog::create_customer),
            )
            .route(
                "/customers/:id",
                get(handlers::catalog::get_customer)
                    .put(handlers::catalog::update_customer)
                    .delete(handlers::catalog::delete_customer),
            )
            // Discounts
            .route(
                "/discounts",
                get(handlers::discounts::list_discounts).post(handlers::discounts::create_discount),
            )
            .route(
                "/discounts/:id",
                get(handlers::discounts::get_discount)
                    .put(handlers::discounts::update_discount)
                    .delete(handlers::discounts::delete_discount),
            )
            .route("/discounts/preview", post(handlers::discounts::preview_discount))
            // Point of sale
            .route("/pos/checkout", post(handlers::pos::checkout_handler))
            .route("/pos/refunds", post(handlers::pos::refund_handler))
            .route(
                "/pos/holds",
                get(handlers::pos::list_holds).post(handlers::pos::hold_order),
            )
            .route("/pos/holds/:id", delete(handlers::pos::delete_hold))
            .route("/pos/holds/:id/resume", post(handlers::pos::resume_hold))
            // Purchasing
            .route(
                "/purchase-orders",
                get(handlers::purchasing::list_purchase_orders)
                    .post(handlers::purchasing::create_purchase_order),
            )
            .route(
                "/purchase-orders/:id",
                get(handlers::purchasing::get_purchase_order),
            )
            .route(
                "/purchase-orders/:id/receipts",
                get(handlers::purchasing::list_purchase_receipts),
            )
            .route(
                "/purchase-orders/:id/cancel",
                post(handlers::purchasing::cancel_purchase_order),
            )
            .route(
                "/order-items/:id/receive",
                post(handlers::purchasing::receive_order_item),
            )
            // Reports
            .route("/reports/sales", get(handlers::reports::sales_report))
            .route("/reports/inventory", get(handlers::reports::inventory_report))
            .route(
                "/reports/inventory/export",
                get(handlers::reports::inventory_export),
            )
            // Settings
            .route(
                "/settings",
                get(handlers::settings::get_settings).put(handlers::settings::update_settings),
            )
            // Activity
            .route(
                "/activity",
                get(handlers::activity::list_activity).post(handlers::activity::record_activity),
            )
            .with_state(self.state.clone());

        let router = health_router
            .merge(api_router)
            .layer(TraceLayer::new_for_http())
            .layer(middleware::from_fn(request_id_middleware))
            .layer(CorsLayer::permissive());

        tracing::info!(
            service = "pos-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, router).await
    }
}
